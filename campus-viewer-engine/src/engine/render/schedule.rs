use bevy::prelude::*;
use bevy::window::{RequestRedraw, WindowResized};
use constants::render::MIN_RENDER_INTERVAL;

/// Render-on-demand scheduler.
///
/// The viewer never renders continuously: a frame is presented only when some
/// event asked for one (load completion, resize, pointer interaction, orbit
/// change, animation step). Requests arriving while one is already pending
/// are no-ops, and a pending request only fires once the minimum interval
/// since the previous render has elapsed, so a burst of input collapses into
/// a single frame while the settled state is always rendered.
#[derive(Resource, Debug)]
pub struct RenderSchedule {
    /// Wall-clock second at which the pending request becomes due.
    pending_due: Option<f64>,
    last_render_at: f64,
    renders: u64,
}

impl Default for RenderSchedule {
    fn default() -> Self {
        Self {
            pending_due: None,
            last_render_at: 0.0,
            renders: 0,
        }
    }
}

impl RenderSchedule {
    /// Ask for a render at time `now`. Coalesces with any pending request.
    pub fn request(&mut self, now: f64) {
        if self.pending_due.is_some() {
            return;
        }
        self.pending_due = Some((self.last_render_at + MIN_RENDER_INTERVAL).max(now));
    }

    /// Consume the pending request if its due time has arrived. Returns true
    /// exactly when a frame should be presented.
    pub fn take_due(&mut self, now: f64) -> bool {
        match self.pending_due {
            Some(due) if now >= due => {
                self.pending_due = None;
                self.last_render_at = now;
                self.renders += 1;
                true
            }
            _ => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending_due.is_some()
    }

    /// Total frames presented since startup.
    pub fn renders(&self) -> u64 {
        self.renders
    }
}

/// Drain the scheduler each tick, forwarding due requests to winit.
pub fn flush_render_requests(
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
    mut redraw: EventWriter<RequestRedraw>,
) {
    if schedule.take_due(time.elapsed_secs_f64()) {
        redraw.write(RequestRedraw);
    }
}

/// A resize invalidates the presented frame; ask for a fresh one.
pub fn request_render_on_resize(
    mut resizes: EventReader<WindowResized>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
) {
    if resizes.read().next().is_some() {
        schedule.request(time.elapsed_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Step a simulated clock in 1 ms increments, counting presented frames.
    fn drain(schedule: &mut RenderSchedule, from: f64, to: f64) -> u64 {
        let before = schedule.renders();
        let mut now = from;
        while now <= to {
            let _ = schedule.take_due(now);
            now += 0.001;
        }
        schedule.renders() - before
    }

    #[test]
    fn burst_of_requests_coalesces_into_one_render() {
        let mut schedule = RenderSchedule::default();
        for i in 0..10 {
            schedule.request(i as f64 * 0.005); // 10 requests inside 80 ms
        }
        assert_eq!(drain(&mut schedule, 0.0, 0.5), 1);
    }

    #[test]
    fn request_while_pending_is_a_no_op() {
        let mut schedule = RenderSchedule::default();
        schedule.request(0.0);
        assert!(schedule.has_pending());
        schedule.request(0.010);
        schedule.request(0.020);
        assert_eq!(drain(&mut schedule, 0.0, 0.2), 1);
        assert!(!schedule.has_pending());
    }

    #[test]
    fn settled_input_always_gets_a_final_frame() {
        let mut schedule = RenderSchedule::default();
        schedule.request(0.0);
        assert_eq!(drain(&mut schedule, 0.0, 0.2), 1);
        // a request after the interval has long passed renders promptly
        schedule.request(1.0);
        assert_eq!(drain(&mut schedule, 1.0, 1.001), 1);
    }

    #[test]
    fn sustained_interaction_is_rate_limited() {
        let mut schedule = RenderSchedule::default();
        // continuous orbit drag: request every 4 ms for one second
        let mut now = 0.0;
        while now < 1.0 {
            schedule.request(now);
            let _ = schedule.take_due(now);
            now += 0.004;
        }
        // at an 80 ms floor, one second of drag yields at most ~13 frames
        assert!(schedule.renders() <= 13);
        assert!(schedule.renders() >= 11);
    }
}
