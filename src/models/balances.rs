use anyhow::bail;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Balance {
    pub affiliate_id: String,
    pub open_cents: i64,
    pub pending_cents: i64,
    pub settled_cents: i64,
    pub hold_cents: i64,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct BalanceEntry {
    pub id: String,
    pub affiliate_id: String,
    pub event: String,
    pub amount_cents: i64,
    pub created_at: chrono::NaiveDateTime,
}

/// A movement across the four balance buckets. Amounts are positive cents.
#[derive(Clone, Copy, Debug)]
pub enum BalanceEvent {
    Commission(i64),
    CommissionHeld(i64),
    HoldReleased(i64),
    HoldForfeited(i64),
    PayoutRequested(i64),
    PayoutPaid(i64),
    PayoutRejected(i64),
}

impl BalanceEvent {
    pub fn label(&self) -> &'static str {
        match self {
            BalanceEvent::Commission(_) => "commission",
            BalanceEvent::CommissionHeld(_) => "commission_held",
            BalanceEvent::HoldReleased(_) => "hold_released",
            BalanceEvent::HoldForfeited(_) => "hold_forfeited",
            BalanceEvent::PayoutRequested(_) => "payout_requested",
            BalanceEvent::PayoutPaid(_) => "payout_paid",
            BalanceEvent::PayoutRejected(_) => "payout_rejected",
        }
    }

    pub fn amount_cents(&self) -> i64 {
        match *self {
            BalanceEvent::Commission(x)
            | BalanceEvent::CommissionHeld(x)
            | BalanceEvent::HoldReleased(x)
            | BalanceEvent::HoldForfeited(x)
            | BalanceEvent::PayoutRequested(x)
            | BalanceEvent::PayoutPaid(x)
            | BalanceEvent::PayoutRejected(x) => x,
        }
    }
}

impl Balance {
    /// Apply a bucket transition. Debited buckets must cover the amount;
    /// buckets never go negative.
    pub fn apply(&self, event: BalanceEvent) -> Result<Balance, anyhow::Error> {
        if event.amount_cents() <= 0 {
            bail!("Amount must be positive");
        }

        let mut next = self.clone();
        match event {
            BalanceEvent::Commission(x) => next.open_cents += x,
            BalanceEvent::CommissionHeld(x) => next.hold_cents += x,
            BalanceEvent::HoldReleased(x) => {
                debit(&mut next.hold_cents, x, "hold")?;
                next.open_cents += x;
            }
            BalanceEvent::HoldForfeited(x) => debit(&mut next.hold_cents, x, "hold")?,
            BalanceEvent::PayoutRequested(x) => {
                debit(&mut next.open_cents, x, "open")?;
                next.pending_cents += x;
            }
            BalanceEvent::PayoutPaid(x) => {
                debit(&mut next.pending_cents, x, "pending")?;
                next.settled_cents += x;
            }
            BalanceEvent::PayoutRejected(x) => {
                debit(&mut next.pending_cents, x, "pending")?;
                next.open_cents += x;
            }
        }

        Ok(next)
    }
}

fn debit(bucket: &mut i64, amount: i64, name: &str) -> Result<(), anyhow::Error> {
    if *bucket < amount {
        bail!("Insufficient {} balance", name);
    }
    *bucket -= amount;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(open: i64, pending: i64, settled: i64, hold: i64) -> Balance {
        Balance {
            affiliate_id: "aff-1".to_string(),
            open_cents: open,
            pending_cents: pending,
            settled_cents: settled,
            hold_cents: hold,
            updated_at: chrono::NaiveDateTime::default(),
        }
    }

    #[test]
    fn commission_credits_open() {
        let next = balance(100, 0, 0, 0)
            .apply(BalanceEvent::Commission(250))
            .unwrap();
        assert_eq!(next.open_cents, 350);
        assert_eq!(next.pending_cents, 0);
    }

    #[test]
    fn payout_request_moves_open_to_pending() {
        let next = balance(1000, 0, 0, 0)
            .apply(BalanceEvent::PayoutRequested(600))
            .unwrap();
        assert_eq!(next.open_cents, 400);
        assert_eq!(next.pending_cents, 600);
    }

    #[test]
    fn payout_request_fails_on_insufficient_open() {
        let err = balance(100, 0, 0, 0)
            .apply(BalanceEvent::PayoutRequested(600))
            .unwrap_err();
        assert!(err.to_string().contains("open"));
    }

    #[test]
    fn payout_paid_settles_pending() {
        let next = balance(0, 600, 0, 0)
            .apply(BalanceEvent::PayoutPaid(600))
            .unwrap();
        assert_eq!(next.pending_cents, 0);
        assert_eq!(next.settled_cents, 600);
    }

    #[test]
    fn payout_rejected_refunds_open() {
        let next = balance(0, 600, 0, 0)
            .apply(BalanceEvent::PayoutRejected(600))
            .unwrap();
        assert_eq!(next.pending_cents, 0);
        assert_eq!(next.open_cents, 600);
    }

    #[test]
    fn hold_release_and_forfeit() {
        let held = balance(0, 0, 0, 500);
        let released = held.apply(BalanceEvent::HoldReleased(500)).unwrap();
        assert_eq!(released.hold_cents, 0);
        assert_eq!(released.open_cents, 500);

        let forfeited = held.apply(BalanceEvent::HoldForfeited(500)).unwrap();
        assert_eq!(forfeited.hold_cents, 0);
        assert_eq!(forfeited.open_cents, 0);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(balance(0, 0, 0, 0)
            .apply(BalanceEvent::Commission(0))
            .is_err());
        assert!(balance(0, 0, 0, 0)
            .apply(BalanceEvent::Commission(-5))
            .is_err());
    }
}
