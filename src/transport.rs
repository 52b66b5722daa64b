use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::Result;

/// GATT service exposed by iFit equipment.
pub const SERVICE_UUID: u128 = 0x0000_1533_1412_efde_1523_785f_eabc_d123;

/// RX characteristic: the equipment's receive endpoint, written by the client.
///
/// Write-without-response is acceptable; write-with-response gives stronger
/// ordering.
pub const RX_UUID: u128 = 0x0000_1535_1412_efde_1523_785f_eabc_d123;

/// TX characteristic: the equipment's transmit endpoint. The client must
/// subscribe to notifications before issuing any request.
pub const TX_UUID: u128 = 0x0000_1534_1412_efde_1523_785f_eabc_d123;

/// BLE boundary owned by the session.
///
/// Implementations handle scanning, connection, GATT service discovery, and
/// notification subscription. The session only writes chunks to the RX
/// characteristic and consumes TX notifications; it never touches a BLE stack
/// directly.
pub trait Transport {
    /// Connect to the equipment, discover the iFit service, and subscribe to
    /// TX notifications.
    ///
    /// Returns the channel delivering TX notifications in arrival order.
    /// Dropping the sending half signals a lost connection.
    fn connect(&mut self, timeout: Duration) -> Result<Receiver<Vec<u8>>>;

    /// Write one chunk to the RX characteristic, completing before return.
    ///
    /// Chunks of a request must not interleave; the session writes them
    /// strictly in sequence.
    fn write_chunk(&mut self, chunk: &[u8]) -> Result<()>;

    /// Tear down the connection.
    fn disconnect(&mut self) -> Result<()>;
}
