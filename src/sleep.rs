use crate::{client::PolarClient, error::Result, types::RequestParams, types::Sleep};
use chrono::NaiveDate;

impl PolarClient {
    /// Sleep of the night ending on `date`.
    pub async fn sleep(&self, date: NaiveDate) -> Result<Sleep> {
        let response = self
            .get(
                &format!("/v3/users/sleep/{}", date.format("%Y-%m-%d")),
                RequestParams::bearer(),
            )
            .await?;
        self.decode(response, None).await
    }

    /// Sleep over the last 28 days.
    pub async fn last_sleeps(&self) -> Result<Vec<Sleep>> {
        let response = self.get("/v3/users/sleep", RequestParams::bearer()).await?;
        self.decode(response, Some("nights")).await
    }
}
