use serde::Serialize;

use pilotsync_api::protocol::BluetoothDevice;

/// Host adapter state and the devices it knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bluetooth {
    pub powered: bool,
    pub address: Option<String>,
    pub hostname: Option<String>,
    pub devices: Vec<BluetoothDevice>,
}

impl Bluetooth {
    /// Devices with an active connection, in list order.
    pub fn connected_devices(&self) -> impl Iterator<Item = &BluetoothDevice> {
        self.devices.iter().filter(|d| d.connected)
    }

    /// The first connected device that can play media.
    pub fn media_device(&self) -> Option<&BluetoothDevice> {
        self.connected_devices().find(|d| d.media)
    }
}
