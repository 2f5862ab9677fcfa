use crate::{
    core::ensure_finite,
    error::{ScrubError, ScrubResult},
};

/// Upper bound for one integration step. A stalled host delivering a huge
/// delta must not blow up the integrator; excess time is simply dropped.
const MAX_STEP_SECS: f64 = 1.0 / 15.0;

/// Damped spring parameters treating progress as a point mass converging
/// toward a moving target.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    /// Distance to target under which the spring may come to rest.
    pub rest_delta: f64,
    /// Velocity magnitude under which the spring may come to rest.
    pub rest_speed: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 30.0,
            rest_delta: 0.001,
            rest_speed: 0.001,
        }
    }
}

impl SpringConfig {
    pub fn validate(&self) -> ScrubResult<()> {
        ensure_finite(self.stiffness, "spring stiffness")?;
        ensure_finite(self.damping, "spring damping")?;
        ensure_finite(self.rest_delta, "spring rest_delta")?;
        ensure_finite(self.rest_speed, "spring rest_speed")?;
        if self.stiffness <= 0.0 {
            return Err(ScrubError::configuration("spring stiffness must be > 0"));
        }
        if self.damping <= 0.0 {
            return Err(ScrubError::configuration("spring damping must be > 0"));
        }
        if self.rest_delta <= 0.0 {
            return Err(ScrubError::configuration("spring rest_delta must be > 0"));
        }
        if self.rest_speed <= 0.0 {
            return Err(ScrubError::configuration("spring rest_speed must be > 0"));
        }
        Ok(())
    }
}

/// Second-order filter advanced once per animation tick.
///
/// Once at rest the spring snaps to its target and further steps are no-ops
/// until the target moves, so a settled scene stops doing work.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f64,
    velocity: f64,
    target: f64,
    settled: bool,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f64) -> ScrubResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            settled: true,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
        if (self.target - self.value).abs() >= self.config.rest_delta
            || self.velocity.abs() >= self.config.rest_speed
        {
            self.settled = false;
        } else {
            self.value = self.target;
            self.velocity = 0.0;
            self.settled = true;
        }
    }

    /// Advance one semi-implicit Euler step of `dt` seconds and return the
    /// new value.
    pub fn step(&mut self, dt: f64) -> f64 {
        if self.settled {
            return self.value;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_STEP_SECS)
        } else {
            0.0
        };
        if dt == 0.0 {
            return self.value;
        }

        let accel =
            self.config.stiffness * (self.target - self.value) - self.config.damping * self.velocity;
        self.velocity += accel * dt;
        self.value += self.velocity * dt;

        if (self.target - self.value).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
        {
            self.value = self.target;
            self.velocity = 0.0;
            self.settled = true;
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn invalid_config_is_rejected() {
        for bad in [
            SpringConfig {
                stiffness: 0.0,
                ..SpringConfig::default()
            },
            SpringConfig {
                damping: -1.0,
                ..SpringConfig::default()
            },
            SpringConfig {
                rest_delta: 0.0,
                ..SpringConfig::default()
            },
            SpringConfig {
                stiffness: f64::NAN,
                ..SpringConfig::default()
            },
        ] {
            assert!(bad.validate().is_err());
        }
    }

    #[test]
    fn converges_to_target_and_settles() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.set_target(1.0);
        assert!(!spring.is_settled());

        let mut steps = 0usize;
        while !spring.is_settled() {
            spring.step(DT);
            steps += 1;
            assert!(steps < 5_000, "spring failed to settle");
        }
        assert_eq!(spring.value(), 1.0);
    }

    #[test]
    fn settled_spring_does_not_drift() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.set_target(1.0);
        while !spring.is_settled() {
            spring.step(DT);
        }
        let settled = spring.value();
        for _ in 0..100 {
            assert_eq!(spring.step(DT), settled);
        }
    }

    #[test]
    fn overdamped_defaults_never_overshoot() {
        // damping^2 > 4 * stiffness for the page's parameters, so the value
        // approaches the target from one side.
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.set_target(1.0);
        let mut prev = spring.value();
        for _ in 0..2_000 {
            let v = spring.step(DT);
            assert!(v >= prev - 1e-12);
            assert!(v <= 1.0 + 1e-9);
            prev = v;
            if spring.is_settled() {
                break;
            }
        }
        assert!(spring.is_settled());
    }

    #[test]
    fn huge_or_invalid_dt_is_clamped() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.set_target(1.0);
        let v = spring.step(10.0);
        assert!(v.is_finite());
        assert!((0.0..=1.0).contains(&v));
        assert_eq!(spring.step(f64::NAN), v);
    }

    #[test]
    fn retarget_mid_flight_redirects() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.set_target(1.0);
        for _ in 0..10 {
            spring.step(DT);
        }
        spring.set_target(0.0);
        while !spring.is_settled() {
            spring.step(DT);
        }
        assert_eq!(spring.value(), 0.0);
    }
}
