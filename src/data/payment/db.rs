use mongodb::Database;
use uuid::Uuid;

use super::{PaymentInfoData, PaymentOutcome, PaymentRecord, PAYMENT_COLLECTION_NAME};
use crate::data::class::db::{problem as class_problem, ClassDbExt};
use crate::data::selection::db::SelectionDbExt;
use crate::resp::problem::Problem;

fn report_partial(mut problem: Problem, outcome: &PaymentOutcome) -> Problem {
    problem.insert("outcome", outcome);
    problem
}

#[rocket::async_trait]
pub trait PaymentDbExt {
    async fn insert_payment(&self, record: PaymentRecord) -> Result<Uuid, Problem>;

    /// Record a completed payment: insert the payment record, drop the
    /// cart entry, then claim the seat — strictly in that order.
    ///
    /// The steps are independent writes, not a transaction. Execution
    /// stops at the first failed step and the error carries the partial
    /// [`PaymentOutcome`], so callers can always tell which effects
    /// applied. No compensation is attempted.
    async fn complete_payment(&self, info: PaymentInfoData) -> Result<PaymentOutcome, Problem>;
}

#[rocket::async_trait]
impl PaymentDbExt for Database {
    async fn insert_payment(&self, record: PaymentRecord) -> Result<Uuid, Problem> {
        self.collection(PAYMENT_COLLECTION_NAME)
            .insert_one(
                bson::to_document(&record).expect("PaymentRecord must be serializable to BSON"),
                None,
            )
            .await
            .map_err(Problem::from)?;

        Ok(record.id)
    }

    async fn complete_payment(&self, info: PaymentInfoData) -> Result<PaymentOutcome, Problem> {
        let mut outcome = PaymentOutcome::default();

        self.insert_payment(PaymentRecord::from(&info))
            .await
            .map_err(|p| report_partial(p, &outcome))?;
        outcome.record_inserted = true;

        let removed = self
            .remove_selection(info.selection_id)
            .await
            .map_err(|p| report_partial(p, &outcome))?;
        outcome.selection_removed = removed > 0;

        let seat_taken = self
            .take_seat(info.class_id)
            .await
            .map_err(|p| report_partial(p, &outcome))?;
        outcome.seat_taken = seat_taken;

        if !seat_taken {
            // The conditional update refused: class full (or gone). The
            // record and the removed selection stay as reported.
            return Err(report_partial(
                class_problem::no_seats(info.class_id),
                &outcome,
            ));
        }

        Ok(outcome)
    }
}
