//! The authoritative UDP game server.
//!
//! One socket, four cooperating tasks:
//! - the **receive loop** decodes datagrams and dispatches JOIN/INPUT/PING;
//! - the **simulation task** drives the ECS at real-time cadence;
//! - the **snapshot task** broadcasts authoritative state at 20 Hz;
//! - the **timeout sweep** reclaims slots that have gone silent.
//!
//! Player deaths cross from the simulation tick back to the network side
//! over an unbounded channel, so the death system never touches a socket.
//!
//! Lock order: when both are needed, the session table is locked *before*
//! the registry (session updates decide first, then materialise entity
//! changes). The snapshot and broadcast paths take the locks strictly
//! sequentially and never nest them.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use starwing_ecs::prelude::{Entity, Registry};
use starwing_engine::prelude::{
    build_registry, spawn_player, GameMode, InputControlled, LevelSpawner,
};
use starwing_proto::{decode, encode, Packet, ProtocolError};

use crate::session::{JoinOutcome, SessionTable, SERVER_FULL_ID};
use crate::snapshot;

/// Simulation tick cadence.
pub const SIM_TICK: Duration = Duration::from_millis(16);
/// Snapshot broadcast cadence (20 Hz).
pub const SNAPSHOT_INTERVAL: Duration = Duration::from_millis(50);
/// How often silent slots are swept.
pub const TIMEOUT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
/// Level file loaded at startup, relative to the working directory.
pub const DEFAULT_LEVEL_PATH: &str = "maps/level1.json";

/// Seed for the spawner's fallback generator.
const LEVEL_SEED: u64 = 0x5354_5747;
/// Receive buffer; comfortably above any client-bound datagram.
const RECV_BUFFER_LEN: usize = 1024;
/// At most one malformed-datagram log line per source per second.
const PROTOCOL_LOG_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal server failures. Everything else is logged and survived.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// GameServer
// ---------------------------------------------------------------------------

/// Shared state reachable from every task.
struct ServerInner {
    socket: UdpSocket,
    registry: Mutex<Registry>,
    sessions: Mutex<SessionTable>,
    game: GameMode,
    started: Instant,
    packet_seq: AtomicU16,
    /// Last malformed-datagram log per source, for rate limiting.
    protocol_log: Mutex<HashMap<SocketAddr, Instant>>,
}

/// The assembled server, ready to [`run`](GameServer::run).
pub struct GameServer {
    inner: Arc<ServerInner>,
    death_rx: mpsc::UnboundedReceiver<Entity>,
    spawner: LevelSpawner,
}

impl GameServer {
    /// Bind the socket and assemble the simulation.
    ///
    /// A missing or malformed level file is logged and replaced by the
    /// fallback spawner; only the bind itself is fatal.
    pub async fn new(hostname: &str, port: u16, game: GameMode) -> Result<GameServer, ServerError> {
        let socket = UdpSocket::bind((hostname, port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{hostname}:{port}"),
                source,
            })?;

        let (death_tx, death_rx) = mpsc::unbounded_channel();
        let registry = build_registry(
            game,
            Some(Box::new(move |entity| {
                let _ = death_tx.send(entity);
            })),
        );

        let spawner = match LevelSpawner::load(Path::new(DEFAULT_LEVEL_PATH), LEVEL_SEED) {
            Ok(spawner) => spawner,
            Err(err) => {
                tracing::warn!(
                    %err,
                    path = DEFAULT_LEVEL_PATH,
                    "level unavailable, continuing with the fallback spawner"
                );
                LevelSpawner::empty(LEVEL_SEED)
            }
        };

        Ok(GameServer {
            inner: Arc::new(ServerInner {
                socket,
                registry: Mutex::new(registry),
                sessions: Mutex::new(SessionTable::new()),
                game,
                started: Instant::now(),
                packet_seq: AtomicU16::new(0),
                protocol_log: Mutex::new(HashMap::new()),
            }),
            death_rx,
            spawner,
        })
    }

    /// The bound socket address (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.socket.local_addr()
    }

    /// Run until the socket fails fatally or Ctrl-C arrives.
    pub async fn run(self) -> Result<(), ServerError> {
        let GameServer {
            inner,
            mut death_rx,
            mut spawner,
        } = self;

        let sim = {
            let inner = inner.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(SIM_TICK);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                let mut last = Instant::now();
                loop {
                    ticker.tick().await;
                    let now = Instant::now();
                    let dt = now.duration_since(last).as_secs_f32();
                    last = now;

                    let mut registry = inner.registry.lock();
                    registry.update(dt);
                    spawner.update(&mut registry);
                }
            })
        };

        let snapshots = {
            let inner = inner.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(SNAPSHOT_INTERVAL);
                loop {
                    ticker.tick().await;
                    let entities = {
                        let mut registry = inner.registry.lock();
                        snapshot::collect(&mut registry)
                    };
                    inner.broadcast(&Packet::Snapshot { entities }).await;
                }
            })
        };

        let sweeper = {
            let inner = inner.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(TIMEOUT_SWEEP_INTERVAL);
                loop {
                    ticker.tick().await;
                    inner.sweep_timeouts().await;
                }
            })
        };

        let deaths = {
            let inner = inner.clone();
            tokio::spawn(async move {
                while let Some(entity) = death_rx.recv().await {
                    inner.handle_player_death(entity).await;
                }
            })
        };

        let addr = inner.socket.local_addr()?;
        tracing::info!(%addr, game = %inner.game, "UDP server running");

        let mut buf = vec![0u8; RECV_BUFFER_LEN];
        let result = loop {
            tokio::select! {
                received = inner.socket.recv_from(&mut buf) => match received {
                    Ok((len, from)) => inner.handle_datagram(&buf[..len], from).await,
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => continue,
                    Err(err) => {
                        tracing::error!(%err, "socket receive failed");
                        break Err(ServerError::Io(err));
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested");
                    break Ok(());
                }
            }
        };

        sim.abort();
        snapshots.abort();
        sweeper.abort();
        deaths.abort();
        inner.sessions.lock().clear();
        inner.registry.lock().clear();
        tracing::info!("server stopped");
        result
    }
}

// ---------------------------------------------------------------------------
// Packet handling
// ---------------------------------------------------------------------------

impl ServerInner {
    /// Milliseconds since server start, the wire timestamp.
    fn now_ms(&self) -> u32 {
        self.started.elapsed().as_millis() as u32
    }

    fn next_packet_id(&self) -> u16 {
        self.packet_seq.fetch_add(1, Ordering::Relaxed)
    }

    async fn handle_datagram(&self, datagram: &[u8], from: SocketAddr) {
        let (header, packet) = match decode(datagram) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.throttled_protocol_warn(from, &err);
                return;
            }
        };

        // Any well-formed datagram from a joined endpoint refreshes liveness.
        {
            let mut sessions = self.sessions.lock();
            if let Some(player_id) = sessions.find_by_endpoint(from) {
                sessions.touch(player_id, Instant::now());
            }
        }

        match packet {
            Packet::Join { username } => self.handle_join(from, &username).await,
            Packet::Input {
                player_id,
                key_code,
                action,
            } => self.handle_input(from, player_id, key_code, action),
            Packet::Ping => {
                // Echo the probe's id and timestamp back verbatim.
                let response = encode(&Packet::PingResponse, header.packet_id, header.timestamp);
                self.send_raw(&response, from).await;
            }
            other => {
                tracing::debug!(kind = %other.kind(), %from, "ignoring client-bound packet type");
            }
        }
    }

    async fn handle_join(&self, from: SocketAddr, username: &str) {
        let assigned = {
            let mut sessions = self.sessions.lock();
            match sessions.join(from, username, Instant::now()) {
                JoinOutcome::AlreadyJoined(player_id) => {
                    tracing::debug!(player_id, %from, "repeat join, re-sending assignment");
                    player_id
                }
                JoinOutcome::Full => {
                    tracing::info!(%from, username, "join refused, server full");
                    SERVER_FULL_ID
                }
                JoinOutcome::Assigned(player_id) => {
                    // Lock order: sessions, then registry.
                    let mut registry = self.registry.lock();
                    let entity = spawn_player(&mut registry, player_id, self.game);
                    sessions.set_entity(player_id, entity);
                    tracing::info!(
                        player_id,
                        %from,
                        username,
                        active = sessions.active_players(),
                        "player joined"
                    );
                    player_id
                }
            }
        };

        self.send_packet(&Packet::PlayerIdAssign { player_id: assigned }, from)
            .await;
    }

    fn handle_input(&self, from: SocketAddr, player_id: u8, key_code: u8, action: u8) {
        let entity = {
            let sessions = self.sessions.lock();
            let expected = sessions.find_by_endpoint(from);
            if expected != Some(player_id) {
                tracing::warn!(
                    %from,
                    claimed = player_id,
                    expected = ?expected,
                    "input with mismatched player id discarded"
                );
                return;
            }
            sessions
                .slot(player_id)
                .map(|slot| slot.entity)
                .unwrap_or(Entity::INVALID)
        };
        if !entity.is_valid() {
            return;
        }

        let mut registry = self.registry.lock();
        let Some(input) = registry.get_mut::<InputControlled>(entity) else {
            return;
        };
        match action {
            1 => {
                if !input.pressed_keys.contains(&key_code) {
                    input.pressed_keys.push(key_code);
                }
            }
            0 => input.pressed_keys.retain(|&k| k != key_code),
            other => tracing::warn!(action = other, "unknown input action discarded"),
        }
    }

    async fn sweep_timeouts(&self) {
        let now = Instant::now();
        let mut reaped = Vec::new();
        {
            let mut sessions = self.sessions.lock();
            for player_id in sessions.timed_out(now) {
                if let Some(slot) = sessions.release(player_id) {
                    // Lock order: sessions, then registry.
                    let mut registry = self.registry.lock();
                    if slot.entity.is_valid() {
                        let _ = registry.destroy(slot.entity);
                    }
                    reaped.push((player_id, slot.username));
                }
            }
        }
        for (player_id, username) in reaped {
            tracing::info!(player_id, username = %username, "player timed out");
            let message = format!("Player {player_id} ({username}) timed out");
            self.broadcast(&Packet::Timeout { message }).await;
        }
    }

    /// Death-system notification: the entity is already destroyed, the slot
    /// still maps it to a player id.
    async fn handle_player_death(&self, entity: Entity) {
        let released = {
            let mut sessions = self.sessions.lock();
            sessions
                .find_by_entity(entity)
                .and_then(|player_id| sessions.release(player_id))
        };
        if let Some(slot) = released {
            tracing::info!(player_id = slot.player_id, username = %slot.username, "player killed");
            self.broadcast(&Packet::Killed {
                player_id: slot.player_id,
            })
            .await;
        }
    }

    // -- sending --------------------------------------------------------------

    async fn send_packet(&self, packet: &Packet, to: SocketAddr) {
        let bytes = encode(packet, self.next_packet_id(), self.now_ms());
        self.send_raw(&bytes, to).await;
    }

    async fn broadcast(&self, packet: &Packet) {
        let endpoints = self.sessions.lock().endpoints();
        if endpoints.is_empty() {
            return;
        }
        let bytes = encode(packet, self.next_packet_id(), self.now_ms());
        for endpoint in endpoints {
            self.send_raw(&bytes, endpoint).await;
        }
    }

    /// Sends are best-effort: failures are logged and the server carries on.
    async fn send_raw(&self, bytes: &[u8], to: SocketAddr) {
        if let Err(err) = self.socket.send_to(bytes, to).await {
            tracing::warn!(%err, %to, "send failed");
        }
    }

    fn throttled_protocol_warn(&self, from: SocketAddr, err: &ProtocolError) {
        let mut log_times = self.protocol_log.lock();
        let now = Instant::now();
        let due = log_times
            .get(&from)
            .is_none_or(|last| now.duration_since(*last) >= PROTOCOL_LOG_INTERVAL);
        if due {
            log_times.insert(from, now);
            tracing::warn!(%from, %err, "dropping malformed datagram");
        }
    }
}
