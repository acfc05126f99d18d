use std::error::Error;

use crate::{config::BusConfig, usb::Family};

const BUS_CONFIG_FILE: &str = "./rootfs/usr/share/padbus/bus.yaml";

#[tokio::test]
async fn load_shipped_config() -> Result<(), Box<dyn Error>> {
    let config = BusConfig::from_yaml_file(BUS_CONFIG_FILE)?;
    assert_eq!(config.version, 1);
    assert_eq!(config.kind, "BusConfig");
    assert_eq!(config.max_children, Some(16));

    let xusb = config.family(Family::Xusb).ok_or("missing xusb section")?;
    assert_eq!(xusb.vendor_id, Some(0x045E));
    assert_eq!(xusb.product_id, Some(0x028E));

    Ok(())
}

#[tokio::test]
async fn optional_sections_default_to_none() -> Result<(), Box<dyn Error>> {
    let content = "version: 1\nkind: BusConfig\nname: test\n".to_string();
    let config = BusConfig::from_yaml(content)?;
    assert_eq!(config.name, "test");
    assert_eq!(config.max_children, None);
    assert!(config.family(Family::Ds4).is_none());

    Ok(())
}

#[tokio::test]
async fn invalid_config_is_rejected() -> Result<(), Box<dyn Error>> {
    let content = "version: one\nkind: BusConfig\n".to_string();
    let result = BusConfig::from_yaml(content);
    assert!(result.is_err(), "Expected deserialize error, got: {result:?}");

    Ok(())
}

#[tokio::test]
async fn missing_file_is_an_io_error() -> Result<(), Box<dyn Error>> {
    let result = BusConfig::from_yaml_file("./does/not/exist.yaml");
    assert!(matches!(result, Err(super::LoadError::IoError(_))));

    Ok(())
}

#[tokio::test]
async fn registry_uses_family_overrides() -> Result<(), Box<dyn Error>> {
    let content = r#"
version: 1
kind: BusConfig
name: test
max_children: 1
ds4:
  product_id: 0x09CC
"#
    .to_string();
    let config = BusConfig::from_yaml(content)?;
    let mut registry = config.registry();

    let origin = crate::bus::Origin::Internal;
    let device = registry.plug_in(1, Family::Ds4, 0, 0, &origin)?;
    let identity = device.identity();
    assert_eq!(identity.vendor_id, 0x054C);
    assert_eq!(identity.product_id, 0x09CC);
    assert_eq!(identity.hardware_id, "USB\\VID_054C&PID_09CC");

    // Limit of one child
    let result = registry.plug_in(2, Family::Xusb, 0, 0, &origin);
    assert!(result.is_err());
    assert_eq!(registry.len(), 1);

    Ok(())
}
