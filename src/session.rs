use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    chunk, impl_default, Command, CommandOps, EnableCommand, EnableReply, Envelope, Equipment,
    EquipmentFirmwareCommand, EquipmentFirmwareReply, EquipmentInformationCommand,
    EquipmentInformationReply, EquipmentReferenceCommand, EquipmentReferenceReply,
    EquipmentSerialCommand, EquipmentSerialReply, Error, ProtocolError, Reassembler, Result,
    SupportedCapabilitiesCommand, SupportedCapabilitiesReply, SupportedCommandsCommand,
    SupportedCommandsReply, Transport, Value, WriteReadCommand, WriteReadReply,
    ACTIVATION_CODE_LEN, IFIT_LOG_PREFIX,
};

/// Granularity of the cancellation poll while awaiting a response.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Depth of the bounded request FIFO in front of the session worker.
pub const REQUEST_QUEUE_DEPTH: usize = 16;

/// Pacing and addressing options recognized by the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    equipment: Equipment,
    response_timeout: Duration,
    connect_timeout: Duration,
    monitor_interval: Duration,
}

impl SessionConfig {
    /// Creates a [SessionConfig] with the protocol defaults.
    pub fn new() -> Self {
        Self {
            equipment: Equipment::Treadmill,
            response_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(20),
            monitor_interval: Duration::from_secs(1),
        }
    }

    /// Gets the equipment class requests are addressed to.
    pub fn equipment(&self) -> Equipment {
        self.equipment
    }

    /// Sets the equipment class requests are addressed to.
    pub fn set_equipment(&mut self, equipment: Equipment) {
        self.equipment = equipment;
    }

    /// Gets the maximum wait for a response after the request's last chunk is
    /// written. Each observed response chunk restarts the wait.
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Sets the response deadline.
    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.response_timeout = timeout;
    }

    /// Gets the maximum wait for transport connection and service discovery.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Sets the connect deadline.
    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// Gets the pacing between successive polls in monitor mode.
    ///
    /// The session does not pace itself; the knob is exposed for
    /// collaborators running a poll loop.
    pub fn monitor_interval(&self) -> Duration {
        self.monitor_interval
    }

    /// Sets the monitor pacing interval.
    pub fn set_monitor_interval(&mut self, interval: Duration) {
        self.monitor_interval = interval;
    }
}

impl_default!(SessionConfig);

/// Session lifecycle states.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum SessionState {
    #[default]
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Authenticated = 3,
}

impl From<SessionState> for &'static str {
    fn from(s: SessionState) -> Self {
        match s {
            SessionState::Disconnected => "Disconnected",
            SessionState::Connecting => "Connecting",
            SessionState::Connected => "Connected",
            SessionState::Authenticated => "Authenticated",
        }
    }
}

impl From<&SessionState> for &'static str {
    fn from(s: &SessionState) -> Self {
        (*s).into()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(self))
    }
}

/// Cooperative cancellation signal for an in-flight request.
///
/// Clones share one flag; cancelling any clone fails the outstanding request
/// with [Error::Cancelled]. The flag rearms when the next request starts.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a new, unsignalled [CancelToken].
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to the request in flight.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Gets whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn rearm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Tracking record for the single request in flight.
///
/// At most one exists per session; `&mut self` on every operation enforces
/// the discipline without locks.
#[derive(Debug)]
struct PendingRequest {
    expected: Command,
    deadline: Instant,
    reassembler: Reassembler,
}

impl PendingRequest {
    fn new(expected: Command, response_timeout: Duration) -> Self {
        Self {
            expected,
            deadline: Instant::now() + response_timeout,
            reassembler: Reassembler::new(),
        }
    }
}

/// Request/response session over the iFit GATT characteristic pair.
///
/// Owns the transport and the reassembly buffer, correlates each request with
/// its chunked response, and walks the
/// `Disconnected -> Connecting -> Connected -> Authenticated` lifecycle.
/// Writes on the RX characteristic are issued strictly in order and awaited
/// to completion.
///
/// The blocking methods here are for a single owner. Multiple callers go
/// through [Session::spawn], which moves the session onto a worker thread
/// draining a bounded FIFO of requests; see [SessionHandle].
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    state: SessionState,
    notifications: Option<mpsc::Receiver<Vec<u8>>>,
    cancel: CancelToken,
}

impl<T: Transport> Session<T> {
    /// Creates a [Session] over `transport` with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::new())
    }

    /// Creates a [Session] over `transport` with `config`.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            state: SessionState::Disconnected,
            notifications: None,
            cancel: CancelToken::new(),
        }
    }

    /// Gets the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Gets the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Gets a [CancelToken] able to abort the request in flight.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Connect to the equipment and subscribe to notifications.
    pub fn connect(&mut self) -> Result<()> {
        self.state = SessionState::Connecting;

        match self.transport.connect(self.config.connect_timeout) {
            Ok(notifications) => {
                self.notifications = Some(notifications);
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Disconnected;
                Err(err)
            }
        }
    }

    /// Tear down the connection.
    pub fn disconnect(&mut self) -> Result<()> {
        self.state = SessionState::Disconnected;
        self.notifications = None;
        self.transport.disconnect()
    }

    /// Query the set of characteristic IDs the equipment exposes.
    pub fn equipment_information(&mut self) -> Result<BTreeSet<u8>> {
        let reply = self.transact(&EquipmentInformationCommand::new(self.config.equipment))?;
        Ok(EquipmentInformationReply::try_from(&reply)?.into_characteristics())
    }

    /// Query the capability IDs the equipment implements.
    pub fn supported_capabilities(&mut self) -> Result<Vec<u8>> {
        let reply = self.transact(&SupportedCapabilitiesCommand::new(self.config.equipment))?;
        Ok(SupportedCapabilitiesReply::try_from(&reply)?.into_capabilities())
    }

    /// Query the command codes the equipment accepts.
    pub fn supported_commands(&mut self) -> Result<BTreeSet<Command>> {
        let reply = self.transact(&SupportedCommandsCommand::new(self.config.equipment))?;
        Ok(SupportedCommandsReply::try_from(&reply)?.into_commands())
    }

    /// Query the numeric equipment reference.
    pub fn equipment_reference(&mut self) -> Result<u32> {
        let reply = self.transact(&EquipmentReferenceCommand::new(self.config.equipment))?;
        Ok(EquipmentReferenceReply::try_from(&reply)?.reference())
    }

    /// Query the firmware version string.
    pub fn equipment_firmware(&mut self) -> Result<String> {
        let reply = self.transact(&EquipmentFirmwareCommand::new(self.config.equipment))?;
        Ok(EquipmentFirmwareReply::try_from(&reply)?.into_firmware())
    }

    /// Query the serial number string.
    pub fn equipment_serial(&mut self) -> Result<String> {
        let reply = self.transact(&EquipmentSerialCommand::new(self.config.equipment))?;
        Ok(EquipmentSerialReply::try_from(&reply)?.into_serial())
    }

    /// Submit an activation code; on acceptance the session becomes
    /// [SessionState::Authenticated].
    ///
    /// This is the only transition into the authenticated state. A rejected
    /// code fails with [Error::AuthenticationFailed] and leaves the session
    /// [SessionState::Connected].
    pub fn enable(&mut self, code: &[u8; ACTIVATION_CODE_LEN]) -> Result<()> {
        let reply = self.transact(&EnableCommand::new(self.config.equipment, *code))?;
        let reply = EnableReply::try_from(&reply)?;

        if reply.is_ok() {
            self.state = SessionState::Authenticated;
            Ok(())
        } else {
            self.state = SessionState::Connected;
            Err(Error::AuthenticationFailed)
        }
    }

    /// Write values and read characteristics back in one exchange.
    ///
    /// Writing requires [SessionState::Authenticated]; a pure read (empty
    /// `writes`) is permitted from [SessionState::Connected], which is what
    /// monitor mode relies on.
    pub fn write_and_read(
        &mut self,
        writes: &BTreeMap<u8, Value>,
        reads: &BTreeSet<u8>,
    ) -> Result<BTreeMap<u8, Value>> {
        if !writes.is_empty() {
            self.require(SessionState::Authenticated)?;
        }

        let command =
            WriteReadCommand::new(self.config.equipment, writes.clone(), reads.clone())?;
        let reply = self.transact(&command)?;

        Ok(WriteReadReply::parse(reply.payload(), reads)?.into_values())
    }

    fn require(&self, state: SessionState) -> Result<()> {
        if self.state < state {
            Err(Error::failure(format!(
                "session is {}, operation requires {state}",
                self.state
            )))
        } else {
            Ok(())
        }
    }

    /// Send one request and await its reassembled, validated response.
    fn transact<C: CommandOps>(&mut self, command: &C) -> Result<Envelope> {
        self.require(SessionState::Connected)?;
        self.cancel.rearm();
        self.drain();

        let frame = command.encode()?;
        debug!(
            "{IFIT_LOG_PREFIX}: sending {} ({} byte frame)",
            command.command(),
            frame.len()
        );

        for c in chunk::chunk(&frame)? {
            if let Err(err) = self.transport.write_chunk(&c) {
                return Err(self.fail_transport(err));
            }
        }

        let mut pending = PendingRequest::new(command.command(), self.config.response_timeout);
        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let now = Instant::now();
            if now >= pending.deadline {
                return Err(Error::Timeout);
            }
            let wait = (pending.deadline - now).min(CANCEL_POLL);

            let Some(notifications) = self.notifications.as_ref() else {
                return Err(Error::TransportLost);
            };
            match notifications.recv_timeout(wait) {
                Ok(notification) => {
                    // Every observed chunk restarts the response deadline
                    pending.deadline = Instant::now() + self.config.response_timeout;

                    if let Some(frame) = pending.reassembler.push(&notification)? {
                        let envelope = Envelope::decode(&frame)?;
                        if envelope.command() != pending.expected {
                            return Err(ProtocolError::UnexpectedCommand {
                                got: envelope.command(),
                                expected: pending.expected,
                            }
                            .into());
                        }

                        debug!(
                            "{IFIT_LOG_PREFIX}: received {} ({} byte payload)",
                            envelope.command(),
                            envelope.payload().len()
                        );
                        return Ok(envelope);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    // Cancel poll tick; the deadline check above decides
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(self.fail_transport(Error::TransportLost));
                }
            }
        }
    }

    fn fail_transport(&mut self, err: Error) -> Error {
        if matches!(err, Error::TransportLost) {
            self.state = SessionState::Disconnected;
            self.notifications = None;
        }
        err
    }

    /// Discard notifications left over from a timed-out or cancelled
    /// exchange, realigning the stream before the next request.
    fn drain(&mut self) {
        let Some(notifications) = self.notifications.as_ref() else {
            return;
        };

        let mut discarded = 0usize;
        while notifications.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            warn!("{IFIT_LOG_PREFIX}: discarded {discarded} stale notification(s)");
        }
    }

    fn dispatch(&mut self, request: SessionRequest) -> Result<SessionResponse> {
        match request {
            SessionRequest::Connect => self.connect().map(|_| SessionResponse::Done),
            SessionRequest::Disconnect => self.disconnect().map(|_| SessionResponse::Done),
            SessionRequest::State => Ok(SessionResponse::State(self.state())),
            SessionRequest::EquipmentInformation => self
                .equipment_information()
                .map(SessionResponse::Characteristics),
            SessionRequest::SupportedCapabilities => self
                .supported_capabilities()
                .map(SessionResponse::Capabilities),
            SessionRequest::SupportedCommands => {
                self.supported_commands().map(SessionResponse::Commands)
            }
            SessionRequest::EquipmentReference => {
                self.equipment_reference().map(SessionResponse::Reference)
            }
            SessionRequest::EquipmentFirmware => {
                self.equipment_firmware().map(SessionResponse::Firmware)
            }
            SessionRequest::EquipmentSerial => {
                self.equipment_serial().map(SessionResponse::Serial)
            }
            SessionRequest::Enable(code) => self.enable(&code).map(|_| SessionResponse::Done),
            SessionRequest::WriteAndRead { writes, reads } => self
                .write_and_read(&writes, &reads)
                .map(SessionResponse::Values),
        }
    }
}

impl<T: Transport + Send + 'static> Session<T> {
    /// Move the session onto a dedicated worker thread, returning a cloneable
    /// [SessionHandle].
    ///
    /// The worker is the single owner of the transport. It drains the request
    /// FIFO in arrival order, one exchange at a time, and answers each caller
    /// through the one-shot channel attached to its request. The thread exits
    /// once every handle is dropped.
    pub fn spawn(self) -> SessionHandle {
        let (requests, queue) = mpsc::sync_channel(REQUEST_QUEUE_DEPTH);
        let cancel = self.cancel_token();

        thread::spawn(move || run(self, queue));

        SessionHandle { requests, cancel }
    }
}

fn run<T: Transport>(mut session: Session<T>, queue: mpsc::Receiver<SessionMessage>) {
    while let Ok(SessionMessage { request, reply }) = queue.recv() {
        let result = session.dispatch(request);
        // A caller that gave up on its reply only abandons this slot
        let _ = reply.send(result);
    }
}

/// Operation submitted to the session worker.
#[derive(Clone, Debug, PartialEq)]
enum SessionRequest {
    Connect,
    Disconnect,
    State,
    EquipmentInformation,
    SupportedCapabilities,
    SupportedCommands,
    EquipmentReference,
    EquipmentFirmware,
    EquipmentSerial,
    Enable([u8; ACTIVATION_CODE_LEN]),
    WriteAndRead {
        writes: BTreeMap<u8, Value>,
        reads: BTreeSet<u8>,
    },
}

/// Typed result delivered on a caller's one-shot reply channel.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionResponse {
    Done,
    State(SessionState),
    Characteristics(BTreeSet<u8>),
    Capabilities(Vec<u8>),
    Commands(BTreeSet<Command>),
    Reference(u32),
    Firmware(String),
    Serial(String),
    Values(BTreeMap<u8, Value>),
}

impl From<&SessionResponse> for &'static str {
    fn from(r: &SessionResponse) -> Self {
        match r {
            SessionResponse::Done => "Done",
            SessionResponse::State(_) => "State",
            SessionResponse::Characteristics(_) => "Characteristics",
            SessionResponse::Capabilities(_) => "Capabilities",
            SessionResponse::Commands(_) => "Commands",
            SessionResponse::Reference(_) => "Reference",
            SessionResponse::Firmware(_) => "Firmware",
            SessionResponse::Serial(_) => "Serial",
            SessionResponse::Values(_) => "Values",
        }
    }
}

impl fmt::Display for SessionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", <&'static str>::from(self))
    }
}

/// A request paired with the one-shot channel its caller blocks on.
struct SessionMessage {
    request: SessionRequest,
    reply: mpsc::SyncSender<Result<SessionResponse>>,
}

/// Cloneable front door to a session running on its own worker thread.
///
/// Requests from every clone funnel into one bounded FIFO; the worker drains
/// it in arrival order and each caller blocks on its own one-shot reply
/// channel, so concurrent callers are served first-come, first-served.
/// Head-of-line blocking is the accepted trade: a slow exchange delays the
/// queue, it never reorders it.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    requests: mpsc::SyncSender<SessionMessage>,
    cancel: CancelToken,
}

impl SessionHandle {
    /// Gets a [CancelToken] able to abort the exchange currently in flight.
    ///
    /// Queued requests are not affected; they run after the cancelled one
    /// fails.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Connect to the equipment and subscribe to notifications.
    pub fn connect(&self) -> Result<()> {
        self.submit(SessionRequest::Connect).map(|_| ())
    }

    /// Tear down the connection.
    pub fn disconnect(&self) -> Result<()> {
        self.submit(SessionRequest::Disconnect).map(|_| ())
    }

    /// Gets the current lifecycle state, as of this request's turn in the
    /// queue.
    pub fn state(&self) -> Result<SessionState> {
        match self.submit(SessionRequest::State)? {
            SessionResponse::State(state) => Ok(state),
            response => Err(unexpected_response(response)),
        }
    }

    /// Query the set of characteristic IDs the equipment exposes.
    pub fn equipment_information(&self) -> Result<BTreeSet<u8>> {
        match self.submit(SessionRequest::EquipmentInformation)? {
            SessionResponse::Characteristics(ids) => Ok(ids),
            response => Err(unexpected_response(response)),
        }
    }

    /// Query the capability IDs the equipment implements.
    pub fn supported_capabilities(&self) -> Result<Vec<u8>> {
        match self.submit(SessionRequest::SupportedCapabilities)? {
            SessionResponse::Capabilities(capabilities) => Ok(capabilities),
            response => Err(unexpected_response(response)),
        }
    }

    /// Query the command codes the equipment accepts.
    pub fn supported_commands(&self) -> Result<BTreeSet<Command>> {
        match self.submit(SessionRequest::SupportedCommands)? {
            SessionResponse::Commands(commands) => Ok(commands),
            response => Err(unexpected_response(response)),
        }
    }

    /// Query the numeric equipment reference.
    pub fn equipment_reference(&self) -> Result<u32> {
        match self.submit(SessionRequest::EquipmentReference)? {
            SessionResponse::Reference(reference) => Ok(reference),
            response => Err(unexpected_response(response)),
        }
    }

    /// Query the firmware version string.
    pub fn equipment_firmware(&self) -> Result<String> {
        match self.submit(SessionRequest::EquipmentFirmware)? {
            SessionResponse::Firmware(firmware) => Ok(firmware),
            response => Err(unexpected_response(response)),
        }
    }

    /// Query the serial number string.
    pub fn equipment_serial(&self) -> Result<String> {
        match self.submit(SessionRequest::EquipmentSerial)? {
            SessionResponse::Serial(serial) => Ok(serial),
            response => Err(unexpected_response(response)),
        }
    }

    /// Submit an activation code; see [Session::enable].
    pub fn enable(&self, code: &[u8; ACTIVATION_CODE_LEN]) -> Result<()> {
        self.submit(SessionRequest::Enable(*code)).map(|_| ())
    }

    /// Write values and read characteristics back in one exchange; see
    /// [Session::write_and_read].
    pub fn write_and_read(
        &self,
        writes: &BTreeMap<u8, Value>,
        reads: &BTreeSet<u8>,
    ) -> Result<BTreeMap<u8, Value>> {
        match self.submit(SessionRequest::WriteAndRead {
            writes: writes.clone(),
            reads: reads.clone(),
        })? {
            SessionResponse::Values(values) => Ok(values),
            response => Err(unexpected_response(response)),
        }
    }

    /// Enqueue one request and block on its one-shot reply.
    fn submit(&self, request: SessionRequest) -> Result<SessionResponse> {
        let (reply, response) = mpsc::sync_channel(1);

        self.requests
            .send(SessionMessage { request, reply })
            .map_err(|_| Error::failure("session worker stopped"))?;

        response
            .recv()
            .map_err(|_| Error::failure("session worker stopped"))?
    }
}

fn unexpected_response(response: SessionResponse) -> Error {
    Error::failure(format!("unexpected session response: {response}"))
}
