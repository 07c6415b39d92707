/*
 *  pacer.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Frame pacing for the render loop
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::{Duration, Instant};

/// Fixed-interval frame clock
///
/// A plugin may change the interval at any time; the new interval applies
/// from the next scheduled deadline.
#[derive(Debug)]
pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
    stats: FrameStats,
}

fn frame_for_fps(fps: u32) -> Duration {
    Duration::from_micros((1_000_000u32 / fps.max(1)) as u64)
}

impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        Self::from_interval(frame_for_fps(target_fps))
    }

    pub fn from_interval(frame: Duration) -> Self {
        let frame = frame.max(Duration::from_millis(1));
        Self {
            next_deadline: Instant::now(),
            frame,
            stats: FrameStats::default(),
        }
    }

    #[inline]
    pub fn set_fps(&mut self, fps: u32) {
        self.set_interval(frame_for_fps(fps));
    }

    #[inline]
    pub fn set_interval(&mut self, frame: Duration) {
        self.frame = frame.max(Duration::from_millis(1));
    }

    pub fn interval(&self) -> Duration {
        self.frame
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Returns true if a frame is due; if true, it also schedules the next deadline.
    #[inline]
    pub fn should_tick(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.next_deadline {
            self.next_deadline = now + self.frame;
            true
        } else {
            false
        }
    }

    /// Record how long the last frame's work took
    pub fn record_frame(&mut self, elapsed: Duration) {
        self.stats.record(elapsed.as_secs_f32() * 1000.0);
    }

    /// Smoothed frame work exceeds the frame interval
    pub fn is_overrunning(&self) -> bool {
        self.stats.ema_ms > self.frame.as_secs_f32() * 1000.0
    }

    pub fn average_frame_ms(&self) -> f32 {
        self.stats.ema_ms
    }
}

#[derive(Debug)]
struct FrameStats {
    ema_ms: f32, // moving avg of frame work
    alpha: f32,  // smoothing (0.1 ~ 0.3)
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            ema_ms: 0.0,
            alpha: 0.2,
        }
    }
}

impl FrameStats {
    fn record(&mut self, frame_ms: f32) {
        self.ema_ms = if self.ema_ms == 0.0 {
            frame_ms
        } else {
            self.alpha * frame_ms + (1.0 - self.alpha) * self.ema_ms
        };
    }
}
