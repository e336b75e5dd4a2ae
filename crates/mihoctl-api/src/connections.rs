// Connection and rule endpoints

use crate::client::MihomoClient;
use crate::error::Error;
use crate::models::{ConnectionsSnapshot, Rule, RulesResponse};

impl MihomoClient {
    /// Point-in-time snapshot of all tracked connections.
    ///
    /// `GET /connections`
    pub async fn list_connections(&self) -> Result<ConnectionsSnapshot, Error> {
        let url = self.url(&["connections"])?;
        self.get(url).await
    }

    /// Close one connection by id.
    ///
    /// `DELETE /connections/{id}`
    pub async fn close_connection(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&["connections", id])?;
        self.delete(url).await
    }

    /// Close every tracked connection.
    ///
    /// `DELETE /connections`
    pub async fn close_all_connections(&self) -> Result<(), Error> {
        let url = self.url(&["connections"])?;
        self.delete(url).await
    }

    /// Routing rules in match-priority order.
    ///
    /// `GET /rules`
    pub async fn list_rules(&self) -> Result<Vec<Rule>, Error> {
        let url = self.url(&["rules"])?;
        let resp: RulesResponse = self.get(url).await?;
        Ok(resp.rules)
    }
}
