//! Prints the query strings produced for a few engine endpoints.

use std::time::Duration;

use dockhand::{
    encode_filters, encode_query,
    params::{ContainerStopParameters, EventsParameters, ImagesCreateParameters, ServiceFilter},
};

fn main() -> dockhand::Result<()> {
    let pull = ImagesCreateParameters::pull("alpine", "3.19");
    println!("images/create?{}", encode_query(&pull)?);

    let stop = ContainerStopParameters {
        wait_before_kill: Some(Duration::from_secs(30)),
        ..ContainerStopParameters::default()
    };
    println!("containers/web/stop?{}", encode_query(&stop)?);

    let events = EventsParameters::default()
        .filter("type", "container")
        .filter("event", "die");
    println!("events?{}", encode_query(&events)?);

    let services = ServiceFilter {
        mode: "global".to_string(),
        ..ServiceFilter::default()
    };
    println!("services?{}", encode_filters(&services)?);

    let bogus = ServiceFilter {
        mode: "bogus".to_string(),
        ..ServiceFilter::default()
    };
    if let Err(err) = encode_filters(&bogus) {
        println!("rejected: {err}");
    }

    Ok(())
}
