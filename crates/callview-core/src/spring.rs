//! Damped-spring animation for the overlay offset.
//!
//! Positions are evaluated from the closed-form solution of a damped harmonic
//! oscillator, so the result depends only on elapsed time and not on how the
//! host slices its frame ticks.

use std::time::Duration;

use crate::config::SpringConfig;
use crate::geometry::PanOffset;

/// Stiffness/damping derived from origami tension/friction.
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    stiffness: f64,
    damping: f64,
    mass: f64,
}

impl Coefficients {
    fn from_config(config: &SpringConfig) -> Self {
        Self {
            stiffness: (config.tension - 30.0) * 3.62 + 194.0,
            damping: ((config.friction - 8.0) * 3.0 + 25.0).max(0.0),
            mass: config.mass,
        }
    }
}

/// One axis of a spring, anchored at `to`.
#[derive(Debug, Clone, Copy)]
struct Axis {
    to: f64,
    /// Displacement from `to` at t = 0.
    d0: f64,
    /// Velocity at t = 0.
    v0: f64,
}

impl Axis {
    /// Position and velocity `t` seconds after the spring started.
    fn sample(&self, c: &Coefficients, t: f64) -> (f64, f64) {
        let omega0 = (c.stiffness / c.mass).sqrt();
        let zeta = c.damping / (2.0 * (c.stiffness * c.mass).sqrt());

        let (d, v) = if zeta < 1.0 {
            let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
            let decay = zeta * omega0;
            let envelope = (-decay * t).exp();
            let a = self.d0;
            let b = (self.v0 + decay * a) / omega1;
            let (sin, cos) = (omega1 * t).sin_cos();
            let d = envelope * (a * cos + b * sin);
            let v = envelope * ((omega1 * b - decay * a) * cos - (omega1 * a + decay * b) * sin);
            (d, v)
        } else if zeta == 1.0 {
            let envelope = (-omega0 * t).exp();
            let b = self.v0 + omega0 * self.d0;
            let d = envelope * (self.d0 + b * t);
            let v = envelope * (b - omega0 * (self.d0 + b * t));
            (d, v)
        } else {
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -omega0 * (zeta - root);
            let r2 = -omega0 * (zeta + root);
            let c2 = (self.v0 - r1 * self.d0) / (r2 - r1);
            let c1 = self.d0 - c2;
            let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
            (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
        };

        (self.to + d, v)
    }
}

/// A 2-D spring moving the overlay toward a target offset.
#[derive(Debug, Clone)]
pub struct SpringAnimation {
    config: SpringConfig,
    coefficients: Coefficients,
    x: Axis,
    y: Axis,
    from: PanOffset,
    elapsed: f64,
    position: PanOffset,
    velocity: (f64, f64),
    done: bool,
}

impl SpringAnimation {
    /// Start a spring at `from` moving with `velocity` (px/s) toward `to`.
    pub fn new(config: &SpringConfig, from: PanOffset, to: PanOffset, velocity: (f64, f64)) -> Self {
        let mut animation = Self {
            config: config.clone(),
            coefficients: Coefficients::from_config(config),
            x: Axis {
                to: to.x,
                d0: from.x - to.x,
                v0: velocity.0,
            },
            y: Axis {
                to: to.y,
                d0: from.y - to.y,
                v0: velocity.1,
            },
            from,
            elapsed: 0.0,
            position: from,
            velocity,
            done: false,
        };
        animation.check_rest();
        animation
    }

    pub fn target(&self) -> PanOffset {
        PanOffset::new(self.x.to, self.y.to)
    }

    pub fn position(&self) -> PanOffset {
        self.position
    }

    /// Current velocity in px/s, carried over when the spring is redirected.
    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Advance by `dt` and return the new position. Once at rest the
    /// position is exactly the target.
    pub fn advance(&mut self, dt: Duration) -> PanOffset {
        if self.done {
            return self.position;
        }
        self.elapsed += dt.as_secs_f64();

        let (x, vx) = self.x.sample(&self.coefficients, self.elapsed);
        let (y, vy) = self.y.sample(&self.coefficients, self.elapsed);
        self.position = PanOffset::new(x, y);
        self.velocity = (vx, vy);
        self.check_rest();
        self.position
    }

    fn check_rest(&mut self) {
        let target = self.target();
        let at_rest = |pos: f64, vel: f64, to: f64| {
            vel.abs() <= self.config.rest_speed_threshold
                && (to - pos).abs() <= self.config.rest_displacement_threshold
        };
        let resting = at_rest(self.position.x, self.velocity.0, target.x)
            && at_rest(self.position.y, self.velocity.1, target.y);

        let overshot = self.config.overshoot_clamping
            && overshooting(self.from.x, self.position.x, target.x)
            && overshooting(self.from.y, self.position.y, target.y);

        if resting || overshot {
            self.position = target;
            self.velocity = (0.0, 0.0);
            self.done = true;
        }
    }
}

/// True once `pos` has reached or passed `to` coming from `from`.
fn overshooting(from: f64, pos: f64, to: f64) -> bool {
    if from < to { pos >= to } else { pos <= to }
}
