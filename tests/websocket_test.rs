//! Unit tests for WebSocket module

use copyfeed::types::{ClientMessage, ServerMessage, Trade, TradeAction, TraderIdentity};
use copyfeed::websocket::RoomManager;
use tokio::sync::mpsc;

fn bot_trade(trader_id: &str) -> Trade {
    let who = TraderIdentity {
        id: trader_id.to_string(),
        name: trader_id.to_string(),
        avatar: String::new(),
    };
    let mut trade = Trade::new(&who, "AAPL", TradeAction::Buy, 190.0, 3);
    trade.is_bot = true;
    trade
}

#[test]
fn test_client_message_subscribe_parsing() {
    let json = r#"{"type":"subscribe","traders":["bot-momentum-mike","bot-dca-deb"]}"#;
    let msg: ClientMessage = serde_json::from_str(json).unwrap();

    match msg {
        ClientMessage::Subscribe { traders } => {
            assert_eq!(traders.len(), 2);
            assert!(traders.contains(&"bot-dca-deb".to_string()));
        }
        _ => panic!("Expected Subscribe message"),
    }
}

#[test]
fn test_client_message_unsubscribe_parsing() {
    let json = r#"{"type":"unsubscribe","traders":["bot-dca-deb"]}"#;
    let msg: ClientMessage = serde_json::from_str(json).unwrap();

    match msg {
        ClientMessage::Unsubscribe { traders } => assert_eq!(traders, vec!["bot-dca-deb"]),
        _ => panic!("Expected Unsubscribe message"),
    }
}

#[test]
fn test_client_message_missing_traders() {
    let result = serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#);
    assert!(result.is_err());
}

#[test]
fn test_server_message_trades_serialization() {
    let msg = ServerMessage::Trades {
        trades: vec![bot_trade("bot-swing-sam")],
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["type"], "trades");
    assert_eq!(json["trades"][0]["traderId"], "bot-swing-sam");
    assert_eq!(json["trades"][0]["isBot"], true);
}

#[test]
fn test_filtered_delivery_per_client() {
    let manager = RoomManager::new();
    let (tx_all, _rx_all) = mpsc::unbounded_channel();
    let (tx_sam, _rx_sam) = mpsc::unbounded_channel();
    let everyone = manager.register(tx_all);
    let sam_only = manager.register(tx_sam);

    let added = manager.subscribe(sam_only, &["bot-swing-sam".to_string()]);
    assert_eq!(added, vec!["bot-swing-sam"]);

    let batch = vec![bot_trade("bot-swing-sam"), bot_trade("bot-dca-deb")];
    assert_eq!(manager.filter_trades(everyone, &batch).map(|t| t.len()), Some(2));

    let filtered = manager.filter_trades(sam_only, &batch).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].trader_id, "bot-swing-sam");

    manager.unregister(sam_only);
    assert!(manager.filter_trades(sam_only, &batch).is_none());
    assert_eq!(manager.client_count(), 1);
}

#[tokio::test]
async fn test_send_reaches_client() {
    let manager = RoomManager::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = manager.register(tx);

    assert!(manager.send(id, "hello".to_string()));
    assert_eq!(rx.recv().await.unwrap(), "hello");

    manager.broadcast_all("everyone");
    assert_eq!(rx.recv().await.unwrap(), "everyone");
}
