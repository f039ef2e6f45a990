//! Reminder message templating.

use remindd_model::money::format_minor;
use remindd_model::{Participant, RecurringCharge};

/// A rendered reminder, ready for any channel. SMS uses only the body;
/// email uses subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    /// Short summary line.
    pub subject: String,
    /// Full message text.
    pub body: String,
}

impl ReminderMessage {
    /// Render the reminder for one participant's share of a charge.
    ///
    /// Amounts are taken from the live charge at send time, so an amount
    /// edit between scheduling and delivery shows the current numbers.
    pub fn render(
        charge: &RecurringCharge,
        participant: &Participant,
        share_amount: i64,
    ) -> Self {
        let due = charge.next_due_at.format("%b %d, %Y");
        let share = format_minor(share_amount, &charge.currency);
        let total = format_minor(charge.amount, &charge.currency);

        Self {
            subject: format!("Reminder: {} due {}", charge.name, due),
            body: format!(
                "Hi {}, your share of {} is {} (bill total {}), due {}. \
                 Please settle up before the due date.",
                participant.display_name, charge.name, share, total, due
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use remindd_model::{Cadence, Share};

    #[test]
    fn test_render_includes_amounts_and_date() {
        let due = chrono::Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap();
        let charge = RecurringCharge::new(
            "group-1",
            "Internet",
            4800,
            "USD",
            Cadence::Monthly { day: 1 },
            due,
        )
        .unwrap();
        let participant = Participant::new(charge.id, "Ana", Share::Percent(5000))
            .with_email("ana@example.com");

        let message = ReminderMessage::render(&charge, &participant, 2400);
        assert_eq!(message.subject, "Reminder: Internet due Jul 01, 2025");
        assert!(message.body.contains("Hi Ana"));
        assert!(message.body.contains("24.00 USD"));
        assert!(message.body.contains("48.00 USD"));
    }
}
