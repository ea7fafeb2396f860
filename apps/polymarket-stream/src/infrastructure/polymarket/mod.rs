//! Polymarket WebSocket Adapters
//!
//! Clients for the three Polymarket push channels:
//!
//! - **Market**: Orderbook snapshots, price changes, trades (public)
//! - **User**: Order and trade lifecycle for one account (authenticated)
//! - **LiveData**: Topic feed for activity, comments, RFQ, prices (mixed)

pub mod auth;
pub mod channel;
pub mod codec;
pub mod heartbeat;
pub mod reconnect;
pub mod supervisor;
pub mod transport;

pub use auth::Credentials;
pub use channel::{
    CLOB_USER_TOPIC, Endpoints, HandshakeError, LIVE_DATA_WS_URL, LiveDataSubscription,
    MARKET_WS_URL, Subscription, USER_WS_URL,
};
pub use codec::{DecodeResult, EventDecoder};
pub use heartbeat::{Heartbeat, HeartbeatAction, HeartbeatConfig};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
pub use supervisor::{
    ConnectionState, StreamSupervisor, SupervisorConfig, SupervisorError, live_data_stream,
    market_stream, user_stream,
};
pub use transport::{TungsteniteConnector, TungsteniteSocket};
