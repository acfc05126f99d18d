use std::fs::File;
use std::io::Write;

use padbus::config::BusConfig;
use schemars::schema_for;

fn main() {
    let bus_schema = schema_for!(BusConfig);
    let mut file = File::create("./rootfs/usr/share/padbus/schema/bus_v1.json")
        .expect("Failed to create schema file");
    write!(
        file,
        "{}",
        serde_json::to_string_pretty(&bus_schema).expect("Failed to serialize schema")
    )
    .expect("Failed to write schema");
}
