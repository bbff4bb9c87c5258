//! WhatsApp outreach: who to message and what to say.
//!
//! The core only computes the target handle and the text. Opening the
//! share sheet belongs to the presentation layer.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::books::Books;
use crate::types::{Client, StoreSettings};

/// A ready-to-send message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutreachMessage {
    pub client_id: String,
    pub client_name: String,
    /// International digits, e.g. `5511987654321`.
    pub phone: String,
    pub text: String,
}

/// Expands `{name}` (first name) and `{debt}` in a template.
pub fn render(template: &str, client: &Client) -> String {
    let first_name = client.name.split_whitespace().next().unwrap_or(&client.name);
    template
        .replace("{name}", first_name)
        .replace("{debt}", &client.current_debt().to_string())
}

/// Digits only, with the Brazilian country code when it is missing.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_start_matches('0');
    if digits.len() <= 11 {
        format!("55{digits}")
    } else {
        digits.to_string()
    }
}

pub fn message_for(template: &str, client: &Client) -> OutreachMessage {
    OutreachMessage {
        client_id: client.id.clone(),
        client_name: client.name.clone(),
        phone: normalize_phone(&client.phone),
        text: render(template, client),
    }
}

fn is_birthday(birth: NaiveDate, today: NaiveDate) -> bool {
    let leap = NaiveDate::from_ymd_opt(today.year(), 2, 29).is_some();
    // leap-day birthdays are celebrated on Feb 28 in common years
    if birth.month() == 2 && birth.day() == 29 && !leap {
        return today.month() == 2 && today.day() == 28;
    }
    birth.month() == today.month() && birth.day() == today.day()
}

impl Books {
    /// Reminder for every client with an open balance, largest first.
    pub fn debt_reminders(&self, settings: &StoreSettings) -> Vec<OutreachMessage> {
        let mut debtors: Vec<&Client> = self
            .client_values()
            .filter(|c| c.current_debt_cents > 0)
            .collect();
        debtors.sort_by(|a, b| b.current_debt_cents.cmp(&a.current_debt_cents));
        debtors
            .into_iter()
            .map(|c| message_for(&settings.debt_reminder_template, c))
            .collect()
    }

    pub fn birthday_messages(&self, today: NaiveDate, settings: &StoreSettings) -> Vec<OutreachMessage> {
        let mut out: Vec<OutreachMessage> = self
            .client_values()
            .filter(|c| c.birth_date.map_or(false, |b| is_birthday(b, today)))
            .map(|c| message_for(&settings.birthday_template, c))
            .collect();
        out.sort_by(|a, b| a.client_name.cmp(&b.client_name));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::tests::client;

    #[test]
    fn test_render_template() {
        let c = client(12050);
        let text = render("Oi {name}, seu saldo é {debt}.", &c);
        assert_eq!(text, "Oi Ana, seu saldo é R$ 120,50.");
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(11) 98765-4321"), "5511987654321");
        assert_eq!(normalize_phone("+55 11 98765-4321"), "5511987654321");
        assert_eq!(normalize_phone("011 98765-4321"), "5511987654321");
    }

    #[test]
    fn test_debt_reminders_skip_clients_without_debt() {
        let mut paid_up = client(0);
        paid_up.id = "cli-2".to_string();
        let books = Books::from_records(vec![client(5000), paid_up], vec![], vec![], vec![], vec![]);

        let messages = books.debt_reminders(&StoreSettings::default());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("R$ 50,00"));
    }

    #[test]
    fn test_birthdays() {
        let mut c = client(0);
        c.birth_date = NaiveDate::from_ymd_opt(1992, 2, 29);
        let books = Books::from_records(vec![c], vec![], vec![], vec![], vec![]);
        let settings = StoreSettings::default();

        let feb_28 = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(books.birthday_messages(feb_28, &settings).len(), 1);

        let march = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(books.birthday_messages(march, &settings).is_empty());
    }
}
