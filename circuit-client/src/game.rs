use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use circuit_core::networking::ServerBoundEvent;
use circuit_core::progress::RaceSignal;

use crate::hud::{lap_text, signal_text};
use crate::input::InputSource;
use crate::reducer::reduce;
use crate::session::{CampaignState, GameSession};
use crate::simulation::{simulate_tick, TickOutcome};
use crate::transport::Transport;

/// What the client does once the local player wins a race.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishAction {
    Stay,
    Replay,
    Advance,
}

pub struct GameClient<T: Transport, I: InputSource> {
    session: GameSession,
    transport: T,
    input: I,
    frame: Duration,
    on_finish: FinishAction,
}

impl<T: Transport, I: InputSource> GameClient<T, I> {
    pub fn new(
        session: GameSession,
        transport: T,
        input: I,
        frame: Duration,
        on_finish: FinishAction,
    ) -> Self {
        GameClient {
            session,
            transport,
            input,
            frame,
            on_finish,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Join the race and tick until the connection closes or every level
    /// has been won.
    pub fn run(&mut self) {
        self.transport.send(ServerBoundEvent::JoinGame);
        self.transport.flush();

        loop {
            let start = Instant::now();
            self.tick();

            if self.transport.is_closed() {
                info!("connection to server closed");
                break;
            }
            if self.session.race().campaign() == CampaignState::AllLevelsComplete {
                break;
            }

            // sleep out the rest of the frame
            if let Some(remaining) = self.frame.checked_sub(start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        for event in self.transport.poll_incoming() {
            match event.resolve() {
                Some(message) => reduce(&mut self.session, message),
                None => debug!("skipping inbound event with missing fields"),
            }
        }

        let input = self.input.poll(&self.session);
        let outcome = simulate_tick(&mut self.session, input, &mut self.transport);
        if let Some(signal) = outcome.signal {
            info!("{}", signal_text(&self.session, signal));
            if let RaceSignal::RaceComplete { .. } = signal {
                self.finish_race();
            }
        }

        self.transport.flush();
        outcome
    }

    fn finish_race(&mut self) {
        let publish = match self.on_finish {
            FinishAction::Stay => None,
            FinishAction::Replay => self.session.replay_level(),
            FinishAction::Advance => self.session.advance_to_next_level(),
        };
        if let Some(event) = publish {
            self.transport.send(event);
        }
        if let Some(text) = lap_text(&self.session) {
            info!("{}", text);
        }
    }
}
