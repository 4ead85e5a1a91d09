//! Replays a recorded image pull through the scripted transport.
//!
//! Run with `cargo run --example pull --features mock`.

use std::sync::Arc;

use dockhand::{
    CancelToken, Client, MonitorOutcome,
    mock::{MockBody, MockTransport},
    params::ImagesCreateParameters,
    types::ProgressMessage,
};

const SESSION: &str = r#"
{"status":"Pulling from library/alpine","id":"3.19"}
{"status":"Pulling fs layer","progressDetail":{},"id":"c6a83fedfae6"}
{"status":"Downloading","progressDetail":{"current":1400,"total":3400},"progress":"[====>      ]","id":"c6a83fedfae6"}
{"status":"Download complete","progressDetail":{},"id":"c6a83fedfae6"}
{"status":"Pull complete","progressDetail":{},"id":"c6a83fedfae6"}
{"status":"Status: Downloaded newer image for alpine:3.19"}
"#;

#[tokio::main(flavor = "current_thread")]
async fn main() -> dockhand::Result<()> {
    let body = MockBody::from_jsonl_str(SESSION)?;
    let transport = Arc::new(MockTransport::new().respond("images/create", body));
    let client = Client::builder(transport.clone()).api_version("1.41").build();

    let outcome = client
        .create_image(
            &ImagesCreateParameters::pull("alpine", "3.19"),
            |msg: ProgressMessage| {
                let id = msg.id.as_deref().unwrap_or("-");
                let status = msg.status.as_deref().unwrap_or_default();
                match msg.progress_detail {
                    Some(detail) if detail.total > 0 => {
                        println!("{id:>12}  {status} {}/{}", detail.current, detail.total)
                    }
                    _ => println!("{id:>12}  {status}"),
                }
            },
            &CancelToken::new(),
        )
        .await?;

    assert_eq!(outcome, MonitorOutcome::Completed);
    for request in transport.requests().await {
        println!("sent: {request}");
    }

    Ok(())
}
