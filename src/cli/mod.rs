use std::{io, path::PathBuf};

use clap::{Args, Parser};
use fournil::{
    report::ReportFormat,
    run::{CostingRun, RunError},
    store::DataDir,
};
use tracing::info;

pub(crate) mod logging;

#[derive(Debug, Parser)]
#[command(
    name = "fournil",
    about = "Cost and gross margin of bakery orders",
    long_about = None
)]
pub(crate) struct Cli {
    /// Directory holding general.yaml and the ingredients, recipes, products and orders folders
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Ingredient catalog to price base ingredients from
    #[arg(short, long, default_value = "ingredients")]
    ingredients: String,

    /// Orders to process, in order
    #[arg(short, long = "orders", num_args = 1.., default_value = "orders")]
    orders: Vec<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Yaml)]
    format: ReportFormat,

    #[command(flatten)]
    pub(crate) logging: LoggingArgs,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = logging::LogFormat::Compact)]
    pub(crate) log_format: logging::LogFormat,
}

impl Cli {
    /// Process every order and write the report to stdout.
    pub(crate) fn run(self) -> Result<(), RunError> {
        let mut store = DataDir::open(&self.data_dir, &self.ingredients)?;

        info!(
            data_dir = %self.data_dir.display(),
            ingredients = store.catalog().len(),
            "opened data directory"
        );

        let mut run = CostingRun::new(store.settings()?);

        for name in &self.orders {
            let order = store.order(name)?;
            run.process_order(&mut store, name, &order)?;
        }

        let report = run.finish()?;

        report.write_to(io::stdout().lock(), self.format)?;

        Ok(())
    }
}
