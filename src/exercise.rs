use crate::{client::PolarClient, error::Result, types::Exercise, types::RequestParams};

impl PolarClient {
    /// Exercises available for the acting user.
    pub async fn exercises(&self) -> Result<Vec<Exercise>> {
        let response = self.get("/v3/exercises", RequestParams::bearer()).await?;
        self.decode(response, None).await
    }

    pub async fn exercise(&self, id: &str) -> Result<Exercise> {
        let response = self
            .get(&format!("/v3/exercises/{}", id), RequestParams::bearer())
            .await?;
        self.decode(response, None).await
    }
}
