//! Plain-text settlement voucher, formatted for pasting into WhatsApp.

use crate::application::calculator::SettlementBatch;
use crate::config::LedgerConfig;
use crate::domain::location::Location;
use crate::domain::machine::Machine;
use crate::domain::money::Money;
use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use rust_decimal::RoundingStrategy;
use std::fmt;

const RULE: &str = "--------------------------------";

/// Formats an amount the way the voucher shows it: `$ 1.234,5`.
///
/// Rounded half away from zero to two decimals; trailing zero decimals are dropped.
pub fn format_currency(amount: Money) -> String {
    let rounded = amount
        .value()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}$ {},{}", sign, grouped, frac),
        None => format!("{}$ {}", sign, grouped),
    }
}

/// Renders the voucher for a computed batch.
///
/// Lines for machines missing from `machines` are left out; the totals
/// still cover the whole batch.
pub fn render_voucher(
    batch: &SettlementBatch,
    location_name: &str,
    machines: &[Machine],
    config: &LedgerConfig,
    date: NaiveDate,
) -> String {
    let mut text = String::new();
    // fmt::Write for String never fails.
    if write_voucher(&mut text, batch, location_name, machines, config, date).is_err() {
        text.clear();
    }
    text
}

/// Writes the voucher text into any formatter sink.
pub fn write_voucher<W: fmt::Write>(
    out: &mut W,
    batch: &SettlementBatch,
    location_name: &str,
    machines: &[Machine],
    config: &LedgerConfig,
    date: NaiveDate,
) -> fmt::Result {
    writeln!(out, "🧾 *COMPROBANTE DE RECAUDACIÓN*")?;
    writeln!(out, "📍 Cliente: {}", location_name)?;
    writeln!(out, "📅 Fecha: {}", date.format("%-d/%-m/%Y"))?;
    writeln!(out)?;
    writeln!(out, "*DETALLE POR MÁQUINA:*")?;

    for draft in &batch.collections {
        let Some(machine) = machines.iter().find(|m| m.id == draft.machine_id) else {
            continue;
        };
        let split = config.revenue_split.get(machine.category);
        writeln!(out, "🔸 *{}* ({} fichas)", machine.category, draft.token_count)?;
        writeln!(out, "   Total: {}", format_currency(draft.total))?;
        writeln!(
            out,
            "   └ Local ({}%): {}",
            split.owner_percent(),
            format_currency(draft.owner_share)
        )?;
        writeln!(
            out,
            "   └ Mí ({}%): {}",
            split.operator_percent(),
            format_currency(draft.operator_share)
        )?;
        writeln!(out)?;
    }

    writeln!(out, "{}", RULE)?;
    writeln!(out, "💰 *TOTAL CAJA: {}*", format_currency(batch.total_amount))?;
    writeln!(
        out,
        "🏠 *SU PARTE (Local): {}*",
        format_currency(batch.total_owner_share)
    )?;
    writeln!(out, "{}", RULE)?;
    writeln!(
        out,
        "👉 *A ABONAR ({}): {}*",
        config.operator_name,
        format_currency(batch.total_operator_share)
    )
}

/// Builds a WhatsApp share link carrying `text` for the location's phone.
pub fn whatsapp_share_url(location: &Location, text: &str) -> Result<String> {
    let phone = location.whatsapp_number().ok_or_else(|| {
        LedgerError::Validation(format!(
            "location '{}' has no phone number",
            location.name()
        ))
    })?;
    Ok(format!(
        "https://api.whatsapp.com/send?phone={}&text={}",
        phone,
        urlencoding::encode(text)
    ))
}
