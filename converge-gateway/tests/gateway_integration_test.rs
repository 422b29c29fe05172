//! Integration tests for the request → transport → response flow.
//!
//! A recording transport stands in for the network so the exact outbound
//! request can be asserted and canned replies can be fed back.

#![allow(clippy::unwrap_used, reason = "tests")]

use std::{str::FromStr, sync::Mutex};

use converge_gateway::{
    ConvergeGateway, CreditCard, GatewayConfig, GatewayError, Operation, Request, ResponseStatus,
    config::{LIVE_ENDPOINT, TEST_ENDPOINT},
    error::Result,
    request::{FORM_CONTENT_TYPE, WireBody},
    response::{PARSE_FAILURE_MARKER, RecordDelimiter, ResponseFormat},
    transport::{RequestContext, Transport, TransportResponse},
};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
struct RecordedCall {
    url: String,
    content_type: Option<String>,
    body: String,
}

#[derive(Debug)]
struct RecordingTransport {
    status: u16,
    reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    fn replying(reply: &str) -> Self {
        Self::with_status(200, reply)
    }

    fn with_status(status: u16, reply: &str) -> Self {
        Self { status, reply: reply.to_owned(), calls: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    async fn post<'a>(&'a self, ctx: RequestContext<'a>, body: &'a [u8]) -> Result<TransportResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: ctx.url(),
            content_type: ctx.content_type.map(str::to_owned),
            body: String::from_utf8(body.to_vec()).unwrap(),
        });
        Ok(TransportResponse {
            status: self.status,
            body: self.reply.as_bytes().to_vec(),
            headers: vec![("Content-Type".to_owned(), "text/plain".to_owned())],
        })
    }

    fn protocol_name(&self) -> &'static str {
        "recording"
    }
}

#[derive(Debug)]
struct FailingTransport;

impl Transport for FailingTransport {
    async fn post<'a>(&'a self, _ctx: RequestContext<'a>, _body: &'a [u8]) -> Result<TransportResponse> {
        Err(GatewayError::TransportError("connection reset".to_owned()))
    }

    fn protocol_name(&self) -> &'static str {
        "failing"
    }
}

fn test_config() -> GatewayConfig {
    GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_test_mode(true)
}

const APPROVED_VOID: &str = "ssl_result=0|ssl_txn_id=SALE123|ssl_result_message=APPROVAL";

#[tokio::test]
async fn test_void_posts_exact_form_body() {
    let transport = RecordingTransport::replying(APPROVED_VOID);
    let request = Request::new(Operation::Void, &test_config()).with_transaction_reference("SALE123");

    let response = request.send(&transport).await.unwrap();
    assert!(response.is_successful());

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, format!("{TEST_ENDPOINT}/process.do"));
    assert_eq!(calls[0].content_type.as_deref(), Some(FORM_CONTENT_TYPE));
    assert_eq!(
        calls[0].body,
        "ssl_merchant_id=000000&ssl_user_id=USERNAME&ssl_pin=PASSWORD&ssl_test_mode=true\
         &ssl_show_form=false&ssl_result_format=ASCII&ssl_transaction_type=ccvoid&ssl_txn_id=SALE123"
    );
}

#[tokio::test]
async fn test_approved_pipe_reply() {
    let transport = RecordingTransport::replying(APPROVED_VOID);
    let gateway = ConvergeGateway::with_transport(test_config(), transport).unwrap();

    let response = gateway.send(gateway.void("SALE123")).await.unwrap();

    assert!(response.is_successful());
    assert_eq!(response.status(), ResponseStatus::Approved);
    assert_eq!(response.transaction_reference(), Some("SALE123"));
    assert_eq!(response.message(), Some("APPROVAL"));
    assert_eq!(response.code(), Some("0"));
}

#[tokio::test]
async fn test_declined_reply_is_not_an_error() {
    let transport = RecordingTransport::replying(
        "ssl_result=1\nssl_result_message=DECLINED: NSF\nssl_txn_id=SALE124\n",
    );
    let gateway = ConvergeGateway::with_transport(test_config(), transport).unwrap();

    let response = gateway.send(gateway.void("SALE124")).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.status(), ResponseStatus::Declined);
    assert_eq!(response.message(), Some("DECLINED: NSF"));
}

#[tokio::test]
async fn test_gateway_error_block() {
    let transport = RecordingTransport::replying(
        "errorCode=5000\nerrorName=Transaction ID Invalid\nerrorMessage=The transaction ID is invalid",
    );
    let gateway = ConvergeGateway::with_transport(test_config(), transport).unwrap();

    let response = gateway.send(gateway.void("BOGUS")).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.error_code(), Some("5000"));
    assert_eq!(response.error_name(), Some("Transaction ID Invalid"));
    assert_eq!(response.message(), Some("The transaction ID is invalid"));
}

#[tokio::test]
async fn test_empty_reply_is_malformed_not_error() {
    let transport = RecordingTransport::replying("");
    let request = Request::new(Operation::Void, &test_config()).with_transaction_reference("SALE123");

    let response = request.send(&transport).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.status(), ResponseStatus::Malformed);
    assert!(response.message().unwrap().starts_with(PARSE_FAILURE_MARKER));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_validation_failure_makes_no_call() {
    let transport = RecordingTransport::replying(APPROVED_VOID);
    let request = Request::new(Operation::Void, &test_config());

    let err = request.send(&transport).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.to_string(), "The transactionReference parameter is required");
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_every_operation_enforces_requirements_before_sending() {
    let transport = RecordingTransport::replying(APPROVED_VOID);
    for operation in Operation::ALL {
        let err = Request::new(operation, &test_config()).send(&transport).await.unwrap_err();
        assert!(err.missing_field().is_some(), "{operation} sent without required fields");
    }
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let transport = RecordingTransport::with_status(503, "<html>Service Unavailable</html>");
    let request = Request::new(Operation::Void, &test_config()).with_transaction_reference("SALE123");

    let err = request.send(&transport).await.unwrap_err();

    assert!(matches!(err, GatewayError::UnexpectedStatus(503)));
    assert!(err.is_transport());
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_transport_error_propagates_unchanged() {
    let request = Request::new(Operation::Void, &test_config()).with_transaction_reference("SALE123");

    let err = request.send(&FailingTransport).await.unwrap_err();

    assert!(matches!(err, GatewayError::TransportError(ref msg) if msg == "connection reset"));
}

#[tokio::test]
async fn test_send_data_reuses_built_body() {
    let transport = RecordingTransport::replying(APPROVED_VOID);
    let request = Request::new(Operation::Void, &test_config()).with_transaction_reference("SALE123");

    let data = request.data().unwrap();
    assert_eq!(data, request.data().unwrap());

    request.send_data(&transport, &data).await.unwrap();
    request.send_data(&transport, &data).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].body, calls[1].body);
}

#[tokio::test]
async fn test_send_data_posts_caller_body_verbatim() {
    let transport = RecordingTransport::replying(APPROVED_VOID);
    let request = Request::new(Operation::Void, &test_config());

    let mut data = WireBody::new();
    data.insert_wire("ssl_transaction_type", "ccvoid");
    data.insert_wire("ssl_txn_id", "MANUAL-1");
    request.send_data(&transport, &data).await.unwrap();

    assert_eq!(transport.calls()[0].body, "ssl_transaction_type=ccvoid&ssl_txn_id=MANUAL-1");
}

#[tokio::test]
async fn test_live_mode_uses_live_endpoint() {
    let transport = RecordingTransport::replying(APPROVED_VOID);
    let config = GatewayConfig::new("000000", "USERNAME", "PASSWORD");
    let request = Request::new(Operation::Void, &config).with_transaction_reference("SALE123");

    request.send(&transport).await.unwrap();

    let call = &transport.calls()[0];
    assert_eq!(call.url, format!("{LIVE_ENDPOINT}/process.do"));
    assert!(call.body.contains("ssl_test_mode=false"));
}

#[tokio::test]
async fn test_purchase_then_tokenize_flow() {
    let transport = RecordingTransport::replying(
        "ssl_result=0\nssl_txn_id=AA49315-1\nssl_approval_code=CMC142\nssl_token=4421912014039990",
    );
    let gateway = ConvergeGateway::with_transport(test_config(), transport).unwrap();

    let card = CreditCard::new("4111111111111111", 12, 2099).with_cvv("123");
    let request = gateway
        .purchase(Decimal::from_str("19.99").unwrap())
        .with_card(card)
        .with_add_token(true);
    let response = gateway.send(request).await.unwrap();

    assert!(response.is_successful());
    assert_eq!(response.approval_code(), Some("CMC142"));
    assert_eq!(response.card_reference(), Some("4421912014039990"));

    let body = &gateway.transport().calls()[0].body;
    assert!(body.contains("ssl_transaction_type=ccsale"));
    assert!(body.contains("ssl_amount=19.99"));
    assert!(body.contains("ssl_card_number=4111111111111111"));
    assert!(body.contains("ssl_cvv2cvc2_indicator=1"));
    assert!(body.contains("ssl_add_token=Y"));
}

#[tokio::test]
async fn test_configured_delimiter_is_used() {
    let transport = RecordingTransport::replying("ssl_result=0;ssl_txn_id=SALE123");
    let config = test_config().with_response_format(
        ResponseFormat::default().with_delimiter(RecordDelimiter::Char(';')),
    );
    let request = Request::new(Operation::Void, &config).with_transaction_reference("SALE123");

    let response = request.send(&transport).await.unwrap();

    assert!(response.is_successful());
    assert_eq!(response.transaction_reference(), Some("SALE123"));
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("converge-config-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "merchant_id = \"000000\"\nusername = \"USERNAME\"\npassword = \"PASSWORD\"\ntest_mode = true\n",
    )
    .unwrap();

    let config = GatewayConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.endpoint(), TEST_ENDPOINT);
    let data = Request::new(Operation::Void, &config)
        .with_transaction_reference("SALE123")
        .data()
        .unwrap();
    assert_eq!(data.get("ssl_pin"), Some("PASSWORD"));
}

#[test]
fn test_missing_config_file() {
    let err = GatewayConfig::from_file("/nonexistent/converge.toml").unwrap_err();
    assert!(matches!(err, GatewayError::ConfigError(_)));
}
