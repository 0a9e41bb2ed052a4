use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;
use kestrel::testkit::probe;

const TAG_PING: i32 = 0;
const TAG_PONG: i32 = 1;
const TAG_DONE: i32 = 2;

/// Bounces a `Ping`/`Pong` back to whoever sent it, preserving the
/// interaction id, until `rounds` round-trips have happened, then
/// reports the final interaction id and stops.
struct Ponger {
    rounds: u32,
    seen: u32,
    probe: Option<kestrel::testkit::Probe<Option<Identity>>>,
}

impl Actor for Ponger {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        match msg.tag {
            TAG_PING | TAG_PONG => {
                self.seen += 1;
                let interaction = msg.interaction;
                let source = msg.source.expect("ping/pong always has a sender");
                if self.seen >= self.rounds {
                    if let Some(p) = self.probe.take() {
                        p.event(interaction);
                    }
                    ctx.send(source, Message::new((), TAG_DONE));
                    ctx.stop();
                    return;
                }
                let reply_tag = if msg.tag == TAG_PING { TAG_PONG } else { TAG_PING };
                let mut reply = Message::new((), reply_tag);
                if let Some(interaction) = interaction {
                    reply = reply.with_interaction(interaction);
                }
                ctx.send(source, reply);
            }
            _ => {}
        }
    }
}

struct Pinger {
    peer: Option<Identity>,
    interaction: Identity,
}

impl Actor for Pinger {
    fn pre_start(&mut self, ctx: &Context) {
        if let Some(peer) = self.peer {
            let msg = Message::new((), TAG_PING).with_interaction(self.interaction);
            ctx.send(peer, msg);
        }
    }

    fn receive(&mut self, ctx: &Context, msg: Message) {
        if msg.tag == TAG_DONE {
            ctx.stop();
            return;
        }
        let source = msg.source.expect("ping/pong always has a sender");
        let interaction = msg.interaction;
        let reply_tag = if msg.tag == TAG_PING { TAG_PONG } else { TAG_PING };
        let mut reply = Message::new((), reply_tag);
        if let Some(interaction) = interaction {
            reply = reply.with_interaction(interaction);
        }
        ctx.send(source, reply);
    }
}

#[test]
fn ping_pong_preserves_the_interaction_id_round_trip() {
    let sys = ActorSystem::create(Settings::default());
    let interaction = Identity::new();
    let (p, rx) = probe::<Option<Identity>>();

    let ponger = sys
        .add_actor(
            Arc::new(move || {
                Box::new(Ponger {
                    rounds: 4,
                    seen: 0,
                    probe: Some(p.clone()),
                }) as Box<dyn Actor>
            }),
            "ponger",
        )
        .unwrap();

    sys.add_actor(
        Arc::new(move || {
            Box::new(Pinger {
                peer: Some(ponger),
                interaction,
            }) as Box<dyn Actor>
        }),
        "pinger",
    )
    .unwrap();

    let seen_interaction = rx.recv(Duration::from_secs(2));
    assert_eq!(seen_interaction, Some(Some(interaction)));

    sys.shutdown(true);
}

const TAG_WORK: i32 = 0;
const TAG_READY: i32 = 1;
const TAG_DRAIN: i32 = 2;

/// Starts out busy: every `Work` message is stashed rather than acted on.
/// A `Ready` signal flips it into the draining state, where it replays
/// every stashed message in the order it arrived and reports the order
/// to the probe.
struct StashingActor {
    probe: Option<kestrel::testkit::Probe<Vec<u32>>>,
    drained: Vec<u32>,
}

impl Actor for StashingActor {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        match msg.tag {
            TAG_WORK => ctx.stash_push(msg),
            TAG_READY => {
                while let Some(stashed) = ctx.stash_pop_one() {
                    if let Ok(n) = stashed.downcast::<u32>() {
                        self.drained.push(n);
                    }
                }
                let self_id = ctx.myself;
                ctx.send(self_id, Message::new((), TAG_DRAIN));
            }
            TAG_DRAIN => {
                if let Some(p) = self.probe.take() {
                    p.event(self.drained.clone());
                }
            }
            _ => {}
        }
    }
}

#[test]
fn stash_replays_messages_in_fifo_order() {
    let sys = ActorSystem::create(Settings::default());
    let (p, rx) = probe::<Vec<u32>>();

    let actor = sys
        .add_actor(
            Arc::new(move || {
                Box::new(StashingActor {
                    probe: Some(p.clone()),
                    drained: Vec::new(),
                }) as Box<dyn Actor>
            }),
            "stashing-actor",
        )
        .unwrap();

    for n in 0u32..5 {
        sys.send(actor, Message::new(n, TAG_WORK));
    }
    sys.send(actor, Message::new((), TAG_READY));

    rx.assert_recv(vec![0, 1, 2, 3, 4], Duration::from_secs(1));

    sys.shutdown(true);
}

const TAG_EXPECTED: i32 = 0;

/// Calls `await_matching` for a message that never arrives, with a short
/// timeout, and reports whether the timeout fired.
struct Awaiter {
    probe: Option<kestrel::testkit::Probe<bool>>,
}

impl Actor for Awaiter {
    fn pre_start(&mut self, ctx: &Context) {
        let probe = self.probe.take();
        ctx.await_matching(
            |msg: &Message| msg.tag == TAG_EXPECTED,
            move |_ctx: &Context, msg: Message| {
                if let Some(p) = &probe {
                    p.event(msg.tag == kestrel::message::TAG_TIMEOUT);
                }
            },
            Some(Duration::from_millis(100)),
        );
    }

    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

#[test]
fn await_matching_delivers_the_timeout_when_nothing_matches() {
    let sys = ActorSystem::create(Settings::default());
    let (p, rx) = probe::<bool>();

    sys.add_actor(
        Arc::new(move || Box::new(Awaiter { probe: Some(p.clone()) }) as Box<dyn Actor>),
        "awaiter",
    )
    .unwrap();

    rx.assert_recv(true, Duration::from_secs(1));

    sys.shutdown(true);
}
