// src/report.rs
//
// Statement report: reads category totals for one account out of a ledger
// store and writes them as table markup the renderer understands.

use chrono::NaiveDate;

use crate::error::Result;
use crate::ledger::{Amount, CategoryKind, LedgerError, LedgerStore};
use crate::options::RenderOptions;

/// Column split of a statement, in percent of the line width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatementLayout {
    pub name_width: u8,
    pub amount_width: u8,
}

impl Default for StatementLayout {
    fn default() -> Self {
        StatementLayout {
            name_width: 70,
            amount_width: 30,
        }
    }
}

/// `1234` -> `"12.34"`, `-5` -> `"-0.05"`.
pub fn format_amount(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Escape the characters the markup scanner would otherwise interpret.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn row(out: &mut String, layout: &StatementLayout, name: &str, amount: Amount) {
    out.push_str(&format!(
        "<tr><td width=\"{}%\">{}</td><td width=\"{}%\" align=\"right\">{}</td></tr>",
        layout.name_width,
        escape(name),
        layout.amount_width,
        format_amount(amount),
    ));
}

/// Markup for the per-category totals of `account` between `from` and `to`
/// (inclusive), followed by a grand total row.
pub fn statement_markup<S: LedgerStore + ?Sized>(
    store: &S,
    account: &str,
    kind: CategoryKind,
    from: NaiveDate,
    to: NaiveDate,
    layout: &StatementLayout,
) -> Result<String> {
    let account = store.account(account)?;

    let mut out = format!(
        "{} {} {} to {}<br><table>",
        escape(&account.name),
        kind,
        from,
        to
    );
    let overflow = || LedgerError::AmountOverflow(account.name.clone());
    let mut total: Amount = 0;
    for category in store.categories(&account.name)? {
        if category.kind != kind {
            continue;
        }
        let sum = store
            .transactions(category.id, from, to)?
            .iter()
            .try_fold(0, |acc: Amount, t| acc.checked_add(t.amount))
            .ok_or_else(overflow)?;
        total = total.checked_add(sum).ok_or_else(overflow)?;
        row(&mut out, layout, &category.name, sum);
    }
    row(&mut out, layout, "Total", total);
    out.push_str("</table>");
    Ok(out)
}

/// [`statement_markup`] rendered to fixed-width text.
pub fn render_statement<S: LedgerStore + ?Sized>(
    store: &S,
    account: &str,
    kind: CategoryKind,
    from: NaiveDate,
    to: NaiveDate,
    layout: &StatementLayout,
    opts: &RenderOptions,
) -> Result<String> {
    let markup = statement_markup(store, account, kind, from, to, layout)?;
    crate::html_to_text(&markup, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ledger::{Account, MemoryLedger, Transaction};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> MemoryLedger {
        let mut ledger = MemoryLedger::new();
        ledger.create_account(Account::new("Checking", 0)).unwrap();
        let food = ledger
            .create_category("Checking", "Food & Drink", CategoryKind::Expense)
            .unwrap();
        let rent = ledger
            .create_category("Checking", "Rent", CategoryKind::Expense)
            .unwrap();
        let pay = ledger
            .create_category("Checking", "Salary", CategoryKind::Income)
            .unwrap();
        for (category_id, day, amount) in [
            (food, 3, 1250),
            (food, 9, 480),
            (rent, 1, 90000),
            (pay, 1, 250000),
            (food, 28, 99),
        ] {
            ledger
                .add_transaction(Transaction {
                    category_id,
                    date: date(2024, 2, day),
                    amount,
                    memo: String::new(),
                })
                .unwrap();
        }
        ledger
    }

    #[test]
    fn amounts_have_two_decimals() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(1234), "12.34");
        assert_eq!(format_amount(-5), "-0.05");
        assert_eq!(format_amount(i64::MIN), "-92233720368547758.08");
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape("a<b> & c"), "a&lt;b&gt; &amp; c");
    }

    #[test]
    fn markup_lists_matching_categories() {
        let ledger = sample();
        let markup = statement_markup(
            &ledger,
            "Checking",
            CategoryKind::Expense,
            date(2024, 2, 1),
            date(2024, 2, 10),
            &StatementLayout::default(),
        )
        .unwrap();
        assert!(markup.starts_with("Checking expense 2024-02-01 to 2024-02-10<br><table>"));
        assert!(markup.contains(">Food &amp; Drink</td>"));
        assert!(markup.contains(">17.30</td>"));
        assert!(markup.contains(">917.30</td>"));
        assert!(!markup.contains("Salary"));
    }

    #[test]
    fn statement_renders_to_fixed_width() {
        let ledger = sample();
        let opts = RenderOptions::new().max_line_width(30);
        let text = render_statement(
            &ledger,
            "Checking",
            CategoryKind::Expense,
            date(2024, 2, 1),
            date(2024, 2, 29),
            &StatementLayout::default(),
            &opts,
        )
        .unwrap();
        assert_eq!(
            text,
            "Checking expense 2024-02-01 to 2024-02-29\n\
             Food & Drink             18.29\n\
             Rent                    900.00\n\
             Total                   918.29\n"
        );
    }

    fn overflowing_ledger(amounts: &[(&str, Amount)]) -> MemoryLedger {
        let mut ledger = MemoryLedger::new();
        ledger.create_account(Account::new("Vault", 0)).unwrap();
        for (name, amount) in amounts {
            let category_id = match ledger.find_category("Vault", name, CategoryKind::Income) {
                Ok(category) => category.id,
                Err(_) => ledger
                    .create_category("Vault", name, CategoryKind::Income)
                    .unwrap(),
            };
            ledger
                .add_transaction(Transaction {
                    category_id,
                    date: date(2024, 3, 1),
                    amount: *amount,
                    memo: String::new(),
                })
                .unwrap();
        }
        ledger
    }

    #[test]
    fn overflowing_totals_are_an_error() {
        let within_category = overflowing_ledger(&[("Gold", i64::MAX), ("Gold", i64::MAX)]);
        let across_categories = overflowing_ledger(&[("Gold", i64::MAX), ("Silver", 1)]);
        for ledger in [within_category, across_categories] {
            let err = statement_markup(
                &ledger,
                "Vault",
                CategoryKind::Income,
                date(2024, 3, 1),
                date(2024, 3, 31),
                &StatementLayout::default(),
            )
            .unwrap_err();
            assert!(matches!(
                err,
                Error::Ledger(LedgerError::AmountOverflow(ref account)) if account == "Vault"
            ));
        }
    }

    #[test]
    fn unknown_account_is_a_ledger_error() {
        let ledger = MemoryLedger::new();
        let err = statement_markup(
            &ledger,
            "Nope",
            CategoryKind::Income,
            date(2024, 1, 1),
            date(2024, 1, 2),
            &StatementLayout::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Ledger(LedgerError::AccountNotFound(_))
        ));
    }
}
