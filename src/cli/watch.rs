use super::ui;
use crate::core::config::AppConfig;
use crate::core::history::{self, HistoryComparison};
use crate::core::portfolio::{filter_candidates, overlay_holdings, passes_thresholds};
use crate::core::valuation::valuate;
use crate::core::{AggregateMetrics, DecimalPolicy, EnrichedRecord, Fiat, TickerProvider};
use crate::store::{SaveOutcome, SnapshotStore};
use anyhow::Result;
use comfy_table::{Attribute, Cell, CellAlignment, Color};
use console::style;

/// Runs the full pipeline once: fetch, overlay holdings, filter, valuate,
/// diff against the prior snapshot, render, persist.
pub async fn run(config: &AppConfig, provider: &(dyn TickerProvider + Send + Sync)) -> Result<()> {
    let fiat = Fiat::from_code(&config.currency);
    let policy = DecimalPolicy::from_max_price(config.filters.max_price);

    let pb = ui::new_spinner("Fetching market data...");
    let fetched = provider.fetch_tickers(fiat).await;
    pb.finish_and_clear();
    let assets = fetched?;

    let records = overlay_holdings(assets, &config.holdings);
    let candidates = filter_candidates(records, &config.filters);
    let (candidates, totals) = valuate(candidates);

    let store = SnapshotStore::new(config.snapshot_file()?);
    let snapshot = store.load();
    let comparison = history::compare(&candidates, &totals, snapshot.as_ref());

    println!(
        "{}",
        render_report(&candidates, &totals, &comparison, config, fiat, &policy)
    );
    if comparison.is_first_run() {
        println!(
            "{}",
            ui::style_text(
                "No previous snapshot; trends will appear from the next run.",
                ui::StyleType::Subtle
            )
        );
    } else if let Some(snapshot) = &snapshot {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Previous snapshot: {}",
                    snapshot.saved_at.format("%Y-%m-%d %H:%M UTC")
                ),
                ui::StyleType::Subtle
            )
        );
    }

    match store.save_if_changed(&candidates, &totals, comparison.prior_totals.as_ref())? {
        SaveOutcome::Saved => println!("Snapshot saved."),
        SaveOutcome::NotSaved => println!(
            "{}",
            ui::style_text("Snapshot not saved (totals unchanged).", ui::StyleType::Subtle)
        ),
    }

    Ok(())
}

fn render_report(
    candidates: &[EnrichedRecord],
    totals: &AggregateMetrics,
    comparison: &HistoryComparison,
    config: &AppConfig,
    fiat: Fiat,
    policy: &DecimalPolicy,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Price"),
        ui::header_cell("1h"),
        ui::header_cell("24h"),
        ui::header_cell("7d"),
        ui::header_cell("Amount"),
        ui::header_cell(&format!("Value ({})", fiat.code())),
        ui::header_cell("Profit"),
        ui::header_cell("Value (BTC)"),
        ui::header_cell(""),
    ]);

    for record in candidates {
        table.add_row(vec![
            name_cell(record, config),
            price_cell(record, config, fiat, policy),
            percent_cell(record.asset.percent_change_1h),
            percent_cell(record.asset.percent_change_24h),
            percent_cell(record.asset.percent_change_7d),
            amount_cell(record),
            value_cell(record, fiat),
            profit_cell(record),
            btc_value_cell(record, policy),
            ui::trend_cell(
                comparison
                    .for_asset(&record.asset.name)
                    .map(|c| c.percent_change.trend),
            ),
        ]);
    }

    let mut output = format!(
        "Filtered candidates: {}\n\n",
        ui::style_text(&candidates.len().to_string(), ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&render_totals(totals, comparison, fiat));
    output
}

fn name_cell(record: &EnrichedRecord, config: &AppConfig) -> Cell {
    // Held assets that no longer clear the thresholds stay in the report
    // but are dimmed.
    let cell = Cell::new(&record.asset.name).add_attribute(Attribute::Bold);
    if record.is_held() && !passes_thresholds(&record.asset, &config.filters) {
        cell.fg(Color::DarkGrey)
    } else {
        cell
    }
}

fn price_cell(record: &EnrichedRecord, config: &AppConfig, fiat: Fiat, policy: &DecimalPolicy) -> Cell {
    let price = record.asset.price_fiat;
    let precision = policy.for_price(price, config.filters.max_price);
    let text = format!("{}{:.*}", fiat.symbol(), precision, price);
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    if price < config.filters.max_price {
        cell
    } else {
        cell.fg(Color::DarkGrey)
    }
}

fn percent_cell(change: Option<f64>) -> Cell {
    change.map_or_else(ui::na_cell, ui::change_cell)
}

fn amount_cell(record: &EnrichedRecord) -> Cell {
    record.position.as_ref().map_or_else(ui::na_cell, |p| {
        Cell::new(format!("{}", p.amount)).set_alignment(CellAlignment::Right)
    })
}

fn value_cell(record: &EnrichedRecord, fiat: Fiat) -> Cell {
    record.position.as_ref().map_or_else(ui::na_cell, |p| {
        let value = p.amount * record.asset.price_fiat;
        Cell::new(format!("{}{value:.2}", fiat.symbol())).set_alignment(CellAlignment::Right)
    })
}

fn profit_cell(record: &EnrichedRecord) -> Cell {
    record
        .valuation
        .as_ref()
        .map_or_else(ui::na_cell, |v| ui::change_cell(v.percent_change))
}

fn btc_value_cell(record: &EnrichedRecord, policy: &DecimalPolicy) -> Cell {
    record.valuation.as_ref().map_or_else(ui::na_cell, |v| {
        Cell::new(format!("₿{:.*}", policy.fine_precision, v.value_btc))
            .set_alignment(CellAlignment::Right)
    })
}

fn render_totals(
    totals: &AggregateMetrics,
    comparison: &HistoryComparison,
    fiat: Fiat,
) -> String {
    let profit_btc = totals.total_value_btc - totals.total_cost_btc;

    let percent_text = format!("{:.2}%", totals.total_percent_change);
    let percent_styled = if totals.total_value_btc > totals.total_cost_btc {
        style(percent_text).green()
    } else {
        style(percent_text).red()
    };

    let mut line = format!(
        "\n\n{} {} {}",
        ui::style_text("Total:", ui::StyleType::TotalLabel),
        ui::trend_glyph(comparison.totals.map(|t| t.percent_change.trend)),
        percent_styled
    );

    if let Some(totals_cmp) = &comparison.totals {
        line.push_str(&ui::style_text(
            &format!(" ({:+.2}%)", totals_cmp.percent_change.delta),
            ui::StyleType::Subtle,
        ));
    }

    line.push_str(&format!(
        " | {} ₿{}",
        ui::trend_glyph(comparison.totals.map(|t| t.value_btc.trend)),
        ui::signed_text(profit_btc, 3)
    ));

    if let Some(totals_cmp) = &comparison.totals {
        line.push_str(&ui::style_text(
            &format!(" (₿{:+.3})", totals_cmp.value_btc.delta),
            ui::StyleType::Subtle,
        ));
    }

    line.push('\n');
    line.push_str(&ui::style_text(
        &format!(
            "Cost: ₿{} Value: ₿{} {}{:.2}",
            totals.total_cost_btc,
            totals.total_value_btc,
            fiat.symbol(),
            totals.total_value_fiat
        ),
        ui::StyleType::Subtle,
    ));
    line
}
