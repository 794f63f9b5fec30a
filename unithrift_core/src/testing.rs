//! 单元测试共用的 mock 装配

use crate::client::{ClientConfig, MarketClient};
use crate::error::Result;
use crate::http::{MockHttpTransport, RawResponse};
use crate::session::MemorySessionStore;
use std::sync::Arc;

pub fn ok(body: &str) -> Result<RawResponse> {
    respond(200, body)
}

pub fn respond(status: u16, body: &str) -> Result<RawResponse> {
    Ok(RawResponse {
        status,
        body: body.to_string(),
    })
}

pub fn client_with(transport: MockHttpTransport) -> (MarketClient, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let client = MarketClient::with_transport(
        ClientConfig {
            server_url: "http://api.test".to_string(),
            ..ClientConfig::default()
        },
        Arc::new(transport),
        store.clone(),
    );
    (client, store)
}
