//! HTTP transport tests against a local one-shot server.

#![allow(clippy::unwrap_used)]

use parcelledger_colissimo::{
    ColissimoApi, ColissimoConfig, Error, HttpApi, LabelRequest, TrackingFields, TrackingQuery,
};
use parcelledger_core::{
    Address, AddressId, CarrierId, CarrierKind, CarrierService, Credential, CredentialId,
    ServiceId, Shipment, ShipmentContext,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves a single HTTP response and returns the raw request it received.
async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(end) = find(&request, b"\r\n\r\n") {
                let length = content_length(&request[..end]);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
        }

        stream.write_all(&response).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base, handle)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn http_response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

fn context() -> ShipmentContext {
    ShipmentContext {
        shipment: Shipment::new(
            ServiceId(1),
            AddressId::new(1),
            AddressId::new(2),
            "ORDER",
            "PACK",
        ),
        sender: Address::new("Jon", "Doe", "66000", "Perpignan", "FRA"),
        recipient: Address::new("Jane", "Doe", "75001", "Paris", "FRA"),
        service: CarrierService::new(
            "Domicile",
            "DOM",
            CarrierKind::Colissimo,
            CarrierId(1),
            CredentialId(1),
        ),
        credential: Credential::new("123", "password"),
    }
}

#[tokio::test]
async fn test_generate_label_posts_json() {
    let body = b"--b1\r\nContent-Type: application/json\r\n\r\n{\"labelResponse\":{\"parcelNumber\":\"6A1\"}}\r\n--b1\r\nContent-Type: application/octet-stream\r\n\r\n%PDF\r\n--b1--\r\n";
    let (base, server) =
        serve_once(http_response("200 OK", "multipart/mixed; boundary=b1", body)).await;

    let config = ColissimoConfig::default().with_base_url(&base).unwrap();
    let api = HttpApi::new(&config).unwrap();
    let request = LabelRequest::new(
        &context(),
        &config,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    )
    .unwrap();

    let reply = api.generate_label(&request).await.unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "multipart/mixed; boundary=b1");

    let label = reply.into_label().unwrap();
    assert_eq!(label.parcel_number, "6A1");
    assert_eq!(label.document.as_ref(), b"%PDF");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /sls-ws/SlsServiceWSRest/generateLabel HTTP/1.1"));
    assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(raw.contains(r#""contractNumber":"123""#));
    assert!(raw.contains(r#""depositDate":"2024-03-01""#));
}

#[tokio::test]
async fn test_generate_label_keeps_error_status() {
    let body = br#"{"messages":[{"id":"30000","type":"ERROR"}]}"#;
    let (base, server) = serve_once(http_response(
        "400 Bad Request",
        "application/json;charset=UTF-8",
        body,
    ))
    .await;

    let config = ColissimoConfig::default().with_base_url(&base).unwrap();
    let api = HttpApi::new(&config).unwrap();
    let request = LabelRequest::new(
        &context(),
        &config,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    )
    .unwrap();

    let reply = api.generate_label(&request).await.unwrap();
    assert_eq!(reply.status, 400);
    let err = reply.into_label().unwrap_err();
    assert!(matches!(err, Error::Rejected { status: 400, ref messages } if messages[0]["id"] == "30000"));

    server.await.unwrap();
}

#[tokio::test]
async fn test_track_sends_query() {
    let xml = "<Envelope><Body><trackResponse><return>\
               <errorCode>0</errorCode><eventCode>LIVCFM</eventCode>\
               <eventDate>2024-03-02T10:00:00+01:00</eventDate>\
               <eventLibelle>Votre colis est livré</eventLibelle>\
               </return></trackResponse></Body></Envelope>";
    let (base, server) = serve_once(http_response("200 OK", "text/xml", xml.as_bytes())).await;

    let config = ColissimoConfig::default().with_base_url(&base).unwrap();
    let api = HttpApi::new(&config).unwrap();

    let body = api
        .track(TrackingQuery {
            account_number: "123",
            password: "password",
            skybill_number: "6A1",
        })
        .await
        .unwrap();
    let event = TrackingFields::parse(&body).unwrap().into_event().unwrap();
    assert_eq!(event.event_code, "LIVCFM");
    assert_eq!(event.event_libelle, "Votre colis est livré");

    let raw = server.await.unwrap();
    assert!(raw.starts_with(
        "GET /tracking-chargeur-cxf/TrackingServiceWS/track?accountNumber=123&password=password&skybillNumber=6A1 HTTP/1.1"
    ));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let config = ColissimoConfig::default().with_base_url(&base).unwrap();
    let api = HttpApi::new(&config).unwrap();
    let err = api
        .track(TrackingQuery {
            account_number: "123",
            password: "password",
            skybill_number: "6A1",
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
