use std::sync::Arc;
use std::time::Duration;

use kestrel::prelude::*;
use kestrel::testkit::probe;
use kestrel::timer::TimerHandleId;

const TAG_PROBE: i32 = 0;
const TAG_TICK: i32 = 1;

struct ScheduleOnce {
    probe: Option<kestrel::testkit::Probe<()>>,
}

impl Actor for ScheduleOnce {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        match msg.tag {
            TAG_PROBE => {
                self.probe = msg.downcast::<kestrel::testkit::Probe<()>>().ok();
                ctx.schedule_once(ctx.myself, Arc::new(|| Message::new((), TAG_TICK)), Duration::from_millis(100));
            }
            TAG_TICK => {
                if let Some(p) = self.probe.take() {
                    p.event(());
                }
            }
            _ => {}
        }
    }
}

#[test]
fn schedule_once_fires_after_the_delay() {
    let sys = ActorSystem::create(Settings::default());
    let actor = sys
        .add_actor(Arc::new(|| Box::new(ScheduleOnce { probe: None }) as Box<dyn Actor>), "schedule-once")
        .unwrap();

    let (p, rx) = probe::<()>();
    sys.send(actor, Message::new(p, TAG_PROBE));
    rx.assert_recv((), Duration::from_millis(500));

    sys.shutdown(true);
}

struct ScheduleRepeat {
    probe: Option<kestrel::testkit::Probe<()>>,
    counter: u32,
    handle: Option<TimerHandleId>,
}

impl Actor for ScheduleRepeat {
    fn receive(&mut self, ctx: &Context, msg: Message) {
        match msg.tag {
            TAG_PROBE => {
                self.probe = msg.downcast::<kestrel::testkit::Probe<()>>().ok();
                let handle = ctx.schedule_at_fixed_rate(
                    ctx.myself,
                    Arc::new(|| Message::new((), TAG_TICK)),
                    Duration::from_millis(50),
                    Duration::from_millis(50),
                );
                self.handle = Some(handle);
            }
            TAG_TICK => {
                self.counter += 1;
                if self.counter == 5 {
                    if let Some(handle) = self.handle.take() {
                        ctx.cancel_timer(handle);
                    }
                    if let Some(p) = self.probe.take() {
                        p.event(());
                    }
                }
            }
            _ => {}
        }
    }
}

#[test]
fn schedule_at_fixed_rate_ticks_until_cancelled() {
    let sys = ActorSystem::create(Settings::default());
    let actor = sys
        .add_actor(
            Arc::new(|| Box::new(ScheduleRepeat { probe: None, counter: 0, handle: None }) as Box<dyn Actor>),
            "schedule-repeat",
        )
        .unwrap();

    let (p, rx) = probe::<()>();
    sys.send(actor, Message::new(p, TAG_PROBE));
    rx.assert_recv((), Duration::from_secs(2));

    sys.shutdown(true);
}
