use rsvpbot::components::calendar_feed::{CalendarSource, IcsFeed};
use rsvpbot::error::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:event-1\r\n\
DTSTAMP:20240301T000000Z\r\n\
DTSTART:20240304T150000Z\r\n\
SUMMARY:Dentist\r\n\
DESCRIPTION:tel:%20555%201234567\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

/// Serve a single HTTP response on a local port and return the feed URL
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Read until the end of the request headers
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/calendar\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{}/calendar.ics", addr)
}

#[tokio::test]
async fn test_fetch_parses_feed() {
    let url = serve_once("200 OK", FEED).await;
    let events = IcsFeed::new(&url).fetch_events().await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "event-1");
    assert_eq!(events[0].title, "Dentist");
    assert_eq!(
        events[0].description.as_deref(),
        Some("tel:%20555%201234567")
    );
}

#[tokio::test]
async fn test_fetch_maps_error_status() {
    let url = serve_once("404 Not Found", "missing").await;
    let result = IcsFeed::new(&url).fetch_events().await;

    assert!(matches!(result, Err(Error::Fetch { status: 404 })));
}

#[tokio::test]
async fn test_fetch_rejects_html_body() {
    let url = serve_once("200 OK", "<html><body>Moved</body></html>").await;
    let result = IcsFeed::new(&url).fetch_events().await;

    assert!(matches!(result, Err(Error::Parse(_))));
}

#[tokio::test]
async fn test_fetch_connection_failure_is_http_error() {
    // Bind and drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = IcsFeed::new(&format!("http://{}/calendar.ics", addr))
        .fetch_events()
        .await;

    assert!(matches!(result, Err(Error::Http(_))));
}
