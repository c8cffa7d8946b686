//! Client store extractor
//!
//! Every request works against the store of the client that sent it. The
//! client is identified by its peer address, so the server must be run with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::AppState;
use crate::data::{ClientId, Database};
use crate::error::AppError;

/// Store of the requesting client
///
/// # Usage
/// ```ignore
/// async fn handler(ClientStore { db, .. }: ClientStore) -> Result<String, AppError> {
///     Ok(db.list_records().await?.len().to_string())
/// }
/// ```
#[derive(Clone)]
pub struct ClientStore {
    pub client: ClientId,
    pub db: Arc<Database>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientStore
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ConnectInfo(peer) = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .copied()
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("peer address unavailable for request"))
            })?;

        let state = AppState::from_ref(state);
        let client = ClientId::from_ip(peer.ip());
        let db = state.stores.open(&client).await?;

        Ok(ClientStore { client, db })
    }
}
