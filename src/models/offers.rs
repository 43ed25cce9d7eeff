use serde::{Deserialize, Serialize};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PAUSED: &str = "paused";
pub const STATUS_ARCHIVED: &str = "archived";

pub const PAYOUT_FLAT: &str = "flat";
pub const PAYOUT_PERCENT: &str = "percent";

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Offer {
    pub id: String,
    pub name: String,
    pub advertiser: String,
    pub url: String,
    pub status: String,
    pub payout_type: String,
    pub payout_cents: i64,
    pub percent_bps: i64,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl Offer {
    /// Direct commission for a conversion amount, in integer cents.
    pub fn commission_cents(&self, amount_cents: i64) -> i64 {
        match self.payout_type.as_str() {
            PAYOUT_FLAT => self.payout_cents,
            PAYOUT_PERCENT => amount_cents * self.percent_bps / 10_000,
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewOffer {
    pub name: String,
    pub advertiser: String,
    pub url: String,
    pub payout_type: String,
    pub payout_cents: Option<i64>,
    pub percent_bps: Option<i64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateOffer {
    pub name: Option<String>,
    pub advertiser: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub payout_type: Option<String>,
    pub payout_cents: Option<i64>,
    pub percent_bps: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(payout_type: &str, payout_cents: i64, percent_bps: i64) -> Offer {
        Offer {
            id: "offer-1".to_string(),
            name: "Test Offer".to_string(),
            advertiser: "Acme".to_string(),
            url: "https://acme.example".to_string(),
            status: STATUS_ACTIVE.to_string(),
            payout_type: payout_type.to_string(),
            payout_cents,
            percent_bps,
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
        }
    }

    #[test]
    fn flat_payout_ignores_amount() {
        let offer = offer(PAYOUT_FLAT, 500, 0);
        assert_eq!(offer.commission_cents(10), 500);
        assert_eq!(offer.commission_cents(100_000), 500);
    }

    #[test]
    fn percent_payout_truncates() {
        let offer = offer(PAYOUT_PERCENT, 0, 750);
        assert_eq!(offer.commission_cents(10_000), 750);
        // 333 * 750 / 10_000 = 24.975 -> 24
        assert_eq!(offer.commission_cents(333), 24);
    }

    #[test]
    fn unknown_payout_type_pays_nothing() {
        let offer = offer("cpc", 500, 750);
        assert_eq!(offer.commission_cents(10_000), 0);
    }
}
