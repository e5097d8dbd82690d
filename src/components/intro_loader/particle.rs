//! A single particle of the text swarm.
//!
//! Particles steer toward a target pixel using seek-with-arrival steering and
//! blend between two colors over successive frames. All quantities are "per
//! processed frame"; there is no delta-time scaling.

use std::f64::consts::TAU;

use glam::{DVec2, DVec3};
use rand::Rng;

use super::settings::{CLOSE_ENOUGH_TARGET, FORCE_TO_SPEED, ResponsiveSettings};
use super::theme::Color;

/// Below this distance (px) a particle is considered on its target and
/// receives no steering.
const ARRIVED_EPSILON: f64 = 0.1;

/// One point-mass in the swarm.
#[derive(Clone, Debug)]
pub struct Particle {
	/// Logical pixels.
	pub position: DVec2,
	/// Displacement per processed frame.
	pub velocity: DVec2,
	/// Point the particle steers toward.
	pub target: DVec2,
	/// Distance at which arrival braking begins.
	pub close_enough_target: f64,
	/// Fixed at spawn.
	pub max_speed: f64,
	/// Steering limit per frame, `0.08 * max_speed`.
	pub max_force: f64,
	/// Side of the drawn square, in logical pixels.
	pub size: f64,
	/// Blend origin as float RGB channels. Rebasing keeps the fractional part
	/// so repeated transitions do not drift.
	pub start_color: DVec3,
	/// Blend destination.
	pub target_color: Color,
	/// Blend progress from `start_color` to `target_color`, in `[0, 1]`.
	pub color_weight: f64,
	/// Weight added to `color_weight` per frame.
	pub color_blend_rate: f64,
	/// Render color derived by [`Particle::update_color`].
	pub current_color: Color,
	/// Flying off-screen. Removed once outside the margin.
	pub is_killed: bool,
}

impl Default for Particle {
	fn default() -> Self {
		Self {
			position: DVec2::ZERO,
			velocity: DVec2::ZERO,
			target: DVec2::ZERO,
			close_enough_target: CLOSE_ENOUGH_TARGET,
			max_speed: 1.0,
			max_force: 0.1,
			size: 3.0,
			start_color: DVec3::ZERO,
			target_color: Color::rgb(0, 0, 0),
			color_weight: 0.0,
			color_blend_rate: 0.02,
			current_color: Color::rgb(0, 0, 0),
			is_killed: false,
		}
	}
}

/// Point at distance `radius` from `center` in a random direction.
pub fn random_point_on_circle<R: Rng + ?Sized>(rng: &mut R, center: DVec2, radius: f64) -> DVec2 {
	let angle = rng.gen_range(0.0..TAU);
	center + DVec2::from_angle(angle) * radius
}

fn sample<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
	if max > min { rng.gen_range(min..max) } else { min }
}

impl Particle {
	/// Spawn a particle off-screen with limits drawn from `settings`.
	///
	/// The particle starts somewhere on the circle of radius
	/// `(width + height) / 2` around the canvas center, so it always flies in
	/// from outside the visible area.
	pub fn spawn<R: Rng + ?Sized>(
		rng: &mut R,
		settings: &ResponsiveSettings,
		width: f64,
		height: f64,
		start_color: Color,
		target_color: Color,
	) -> Self {
		let center = DVec2::new(width / 2.0, height / 2.0);
		let max_speed = sample(rng, settings.speed_min, settings.speed_max);
		Self {
			position: random_point_on_circle(rng, center, (width + height) / 2.0),
			close_enough_target: settings.close_enough_target,
			max_speed,
			max_force: max_speed * FORCE_TO_SPEED,
			size: sample(rng, settings.particle_size_min, settings.particle_size_max).max(0.0),
			color_blend_rate: sample(rng, settings.color_blend_rate_min, settings.color_blend_rate_max),
			start_color: start_color.to_vec3(),
			target_color,
			current_color: start_color,
			..Self::default()
		}
	}

	/// Desired speed at `distance` from the target.
	///
	/// Full `max_speed` far away, scaled linearly by
	/// `distance / close_enough_target` inside the braking radius.
	pub fn desired_speed(&self, distance: f64) -> f64 {
		if distance < self.close_enough_target && self.close_enough_target > 0.0 {
			self.max_speed * (distance / self.close_enough_target)
		} else {
			self.max_speed
		}
	}

	/// Advance one frame of seek-with-arrival steering.
	pub fn step(&mut self) {
		let offset = self.target - self.position;
		let distance = offset.length();

		if distance.is_finite() && distance > ARRIVED_EPSILON {
			let desired = offset / distance * self.desired_speed(distance);
			let steer = (desired - self.velocity).clamp_length_max(self.max_force);
			self.velocity += steer;
		}

		self.position += self.velocity;

		// A corrupted particle parks on its target instead of poisoning the frame.
		if !self.position.is_finite() || !self.velocity.is_finite() {
			self.velocity = DVec2::ZERO;
			self.position = if self.target.is_finite() {
				self.target
			} else {
				DVec2::ZERO
			};
		}
	}

	/// Advance the color blend by one frame and refresh `current_color`.
	pub fn update_color(&mut self) {
		if self.color_weight < 1.0 {
			self.color_weight = (self.color_weight + self.color_blend_rate).clamp(0.0, 1.0);
		}
		self.current_color = self.blended_color();
	}

	/// Untruncated color at the current blend weight.
	pub fn blended(&self) -> DVec3 {
		let t = if self.color_weight.is_nan() {
			0.0
		} else {
			self.color_weight.clamp(0.0, 1.0)
		};
		self.start_color.lerp(self.target_color.to_vec3(), t)
	}

	/// Render color at the current blend weight.
	pub fn blended_color(&self) -> Color {
		Color::from_vec3(self.blended())
	}

	/// Start a fresh transition from the currently blended color to `target`.
	pub fn retarget_color(&mut self, target: Color) {
		self.start_color = self.blended();
		self.target_color = target;
		self.color_weight = 0.0;
	}

	/// Send the particle flying off-screen and fade it to `background`.
	///
	/// The new target lies `(width + height) / 2` from the canvas center in a
	/// random direction. Calling this on an already killed particle does
	/// nothing.
	pub fn kill<R: Rng + ?Sized>(&mut self, rng: &mut R, width: f64, height: f64, background: Color) {
		if self.is_killed {
			return;
		}
		let center = DVec2::new(width / 2.0, height / 2.0);
		self.target = random_point_on_circle(rng, center, (width + height) / 2.0);
		self.retarget_color(background);
		self.is_killed = true;
	}

	/// True once the particle is outside the canvas by more than `margin`.
	pub fn is_outside(&self, width: f64, height: f64, margin: f64) -> bool {
		self.position.x < -margin
			|| self.position.x > width + margin
			|| self.position.y < -margin
			|| self.position.y > height + margin
	}
}
