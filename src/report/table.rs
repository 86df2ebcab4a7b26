//! Terminal tables

use std::io;

use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};

use super::{ProductReport, Report, ReportError};
use crate::resolver::ResolvedAggregate;

/// Rows where a new product or recipe starts.
type Boundaries = SmallVec<[usize; 16]>;

pub(super) fn write(out: &mut impl io::Write, report: &Report) -> Result<(), ReportError> {
    let mut builder = Builder::default();
    let mut boundaries = Boundaries::new();

    builder.push_record([
        "Product",
        "Pieces",
        "Component",
        "Quantity",
        "Cost/piece",
        "Price/piece",
        "Margin",
    ]);

    let mut row = 1;

    for (name, product) in &report.products {
        boundaries.push(row);
        row += push_product_rows(&mut builder, name, product);
    }

    write_table(out, builder, &boundaries, 1..7)?;

    if report.recipes.is_empty() {
        return Ok(());
    }

    let mut builder = Builder::default();
    let mut boundaries = Boundaries::new();

    builder.push_record(["Recipe", "Component", "Quantity", "Sold"]);

    let mut row = 1;

    for (name, aggregate) in &report.recipes {
        boundaries.push(row);
        row += push_recipe_rows(&mut builder, name, aggregate);
    }

    write_table(out, builder, &boundaries, 2..4)
}

/// Push one row per direct component; returns the number of rows pushed.
fn push_product_rows(builder: &mut Builder, name: &str, product: &ProductReport) -> usize {
    let (price, margin) = match &product.margin {
        Some(margin) => (
            format!("{:.3}", margin.selling_price_per_piece_excl_taxes),
            format!("{:.3}%", margin.gross_margin_rate),
        ),
        None => (String::new(), String::new()),
    };

    let mut components = product.recipe.iter();
    let (first_component, first_quantity) = components
        .next()
        .map(|(display, quantity)| (display.clone(), format!("{quantity:.3}")))
        .unwrap_or_default();

    builder.push_record([
        name.to_string(),
        product.quantity.to_string(),
        first_component,
        first_quantity,
        format!("{:.3}", product.cost_price_per_piece_excl_taxes),
        price,
        margin,
    ]);

    let mut rows = 1;

    for (display, quantity) in components {
        builder.push_record([
            String::new(),
            String::new(),
            display.clone(),
            format!("{quantity:.3}"),
            String::new(),
            String::new(),
            String::new(),
        ]);
        rows += 1;
    }

    rows
}

/// Push one row per component plus a total row; returns the number of rows pushed.
fn push_recipe_rows(builder: &mut Builder, name: &str, aggregate: &ResolvedAggregate) -> usize {
    let mut recipe_cell = name.to_string();

    for (display, quantity) in aggregate.component_totals() {
        builder.push_record([
            std::mem::take(&mut recipe_cell),
            display.clone(),
            format!("{quantity:.3}"),
            String::new(),
        ]);
    }

    builder.push_record([
        std::mem::take(&mut recipe_cell),
        "total".to_string(),
        format!("{:.3}", aggregate.total_weight()),
        aggregate
            .tracked_quantity()
            .map(|quantity| quantity.to_string())
            .unwrap_or_default(),
    ]);

    aggregate.component_totals().len() + 1
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    boundaries: &[usize],
    numeric: std::ops::Range<usize>,
) -> Result<(), ReportError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in boundaries {
        if row > 1 {
            theme.insert_horizontal_line(row, separator);
        }
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    writeln!(out, "\n{table}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use testresult::TestResult;

    use super::*;
    use crate::pricing::Margin;

    #[test]
    fn lists_every_component_of_a_product() -> TestResult {
        let mut recipe = IndexMap::new();
        recipe.insert("flour".to_string(), 60.0);
        recipe.insert("water".to_string(), 30.0);

        let mut report = Report::default();
        report.products.insert(
            "baguette".to_string(),
            ProductReport {
                recipe,
                quantity: 200,
                dough_weight: 0.45,
                cost_price_per_piece_excl_taxes: 0.125,
                margin: None,
            },
        );

        let mut out = Vec::new();
        write(&mut out, &report)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("baguette"), "product row");
        assert!(text.contains("60.000"), "flour quantity");
        assert!(text.contains("30.000"), "water quantity");
        assert!(text.contains("0.125"), "cost per piece");
        assert!(!text.contains("Recipe"), "no recipe table without recipes");

        Ok(())
    }

    #[test]
    fn selling_figures_have_three_decimals() -> TestResult {
        let mut recipe = IndexMap::new();
        recipe.insert("dough".to_string(), 25.0);

        let mut report = Report::default();
        report.products.insert(
            "baguette".to_string(),
            ProductReport {
                recipe,
                quantity: 100,
                dough_weight: 0.25,
                cost_price_per_piece_excl_taxes: 0.123_4,
                margin: Some(Margin {
                    selling_price_per_kg_incl_taxes: 5.21,
                    selling_price_per_piece_incl_taxes: 1.302_5,
                    selling_price_per_piece_excl_taxes: 1.234_56,
                    gross_margin_rate: 90.004_6,
                }),
            },
        );

        let mut out = Vec::new();
        write(&mut out, &report)?;
        let text = String::from_utf8(out)?;

        assert!(text.contains("1.235"), "price per piece: {text}");
        assert!(text.contains("90.005%"), "gross margin: {text}");
        assert!(!text.contains("1.23 "), "no two-decimal price: {text}");

        Ok(())
    }
}
