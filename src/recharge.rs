use crate::{client::PolarClient, error::Result, types::Recharge, types::RequestParams};
use chrono::NaiveDate;

impl PolarClient {
    /// Nightly Recharge for `date`.
    pub async fn recharge(&self, date: NaiveDate) -> Result<Recharge> {
        let response = self
            .get(
                &format!("/v3/users/nightly-recharge/{}", date.format("%Y-%m-%d")),
                RequestParams::bearer(),
            )
            .await?;
        self.decode(response, None).await
    }

    /// Nightly Recharge over the last 28 nights.
    pub async fn last_recharges(&self) -> Result<Vec<Recharge>> {
        let response = self
            .get("/v3/users/nightly-recharge", RequestParams::bearer())
            .await?;
        self.decode(response, Some("recharges")).await
    }
}
