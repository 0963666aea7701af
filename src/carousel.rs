// ABOUTME: Looping carousel state machine
// ABOUTME: Clone-padded index space with transition locking and settle-time normalization

use crate::config::{CAROUSEL_PADDING, CAROUSEL_SETTLE_MS};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One slide of a photo exhibition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub title: String,
    #[serde(alias = "src")]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
}

impl Slide {
    pub fn new(title: &str, image_url: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            image_url: image_url.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CarouselConfig {
    pub padding: usize,
    pub settle_delay: Duration,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            padding: CAROUSEL_PADDING,
            settle_delay: Duration::from_millis(CAROUSEL_SETTLE_MS),
        }
    }
}

/// Map a position in the padded strip back to a position in the real slide list.
///
/// Requires `padding <= len` and `len > 0`.
pub fn logical_index(current: usize, padding: usize, len: usize) -> usize {
    (current + len - padding) % len
}

/// Effective padding for `len` slides: the configured width, or the whole list
/// when there are fewer slides than that.
pub fn effective_padding(len: usize, padding: usize) -> usize {
    if len <= 1 {
        0
    } else {
        padding.min(len)
    }
}

/// Build the padded strip as logical indices: tail clones, real slides, head clones.
pub fn extended_indices(len: usize, padding: usize) -> Vec<usize> {
    if len <= 1 {
        return (0..len).collect();
    }
    let padding = effective_padding(len, padding);

    (len - padding..len)
        .chain(0..len)
        .chain(0..padding)
        .collect()
}

/// An infinitely looping view over a finite slide list.
#[derive(Debug, Clone)]
pub struct LoopingCarousel {
    slides: Vec<Slide>,
    config: CarouselConfig,
    padding: usize,
    extended: Vec<usize>,
    current: usize,
    is_animating: bool,
    is_transitioning: bool,
    settle_deadline: Option<Instant>,
}

impl LoopingCarousel {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self::with_config(slides, CarouselConfig::default())
    }

    pub fn with_config(slides: Vec<Slide>, config: CarouselConfig) -> Self {
        let mut carousel = Self {
            slides: Vec::new(),
            config,
            padding: 0,
            extended: Vec::new(),
            current: 0,
            is_animating: true,
            is_transitioning: false,
            settle_deadline: None,
        };
        carousel.set_slides(slides);
        carousel
    }

    /// Replace the slide list and reset to the first real slide. Any pending
    /// settle is dropped.
    pub fn set_slides(&mut self, slides: Vec<Slide>) {
        self.padding = effective_padding(slides.len(), self.config.padding);
        self.extended = extended_indices(slides.len(), self.config.padding);
        self.slides = slides;
        self.current = self.padding;
        self.is_animating = true;
        self.is_transitioning = false;
        self.settle_deadline = None;
        debug!(
            "Carousel initialized with {} slides, padding {}",
            self.slides.len(),
            self.padding
        );
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn is_looping(&self) -> bool {
        self.slides.len() > 1
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle_deadline
    }

    pub fn extended_len(&self) -> usize {
        self.extended.len()
    }

    /// Slides in strip order, clones included.
    pub fn extended_slides(&self) -> impl Iterator<Item = &Slide> + '_ {
        self.extended.iter().map(move |&i| &self.slides[i])
    }

    /// Index into the real slide list of what is currently shown.
    pub fn active_logical_index(&self) -> usize {
        if self.is_looping() {
            logical_index(self.current, self.padding, self.slides.len())
        } else {
            self.current
        }
    }

    pub fn active_slide(&self) -> Option<&Slide> {
        self.slides.get(self.active_logical_index())
    }

    /// Horizontal strip offset in percent of the strip width.
    pub fn translate_percent(&self) -> f64 {
        if self.extended.is_empty() {
            return 0.0;
        }
        self.current as f64 * 100.0 / self.extended.len() as f64
    }

    /// Step forward. Returns whether the command was accepted.
    pub fn next(&mut self) -> bool {
        if !self.is_looping() || self.is_transitioning {
            return false;
        }
        let target = self.current + 1;
        self.begin_transition(target)
    }

    /// Step backward. Returns whether the command was accepted.
    pub fn previous(&mut self) -> bool {
        if !self.is_looping() || self.is_transitioning {
            return false;
        }
        match self.current.checked_sub(1) {
            Some(target) => self.begin_transition(target),
            None => false,
        }
    }

    /// Jump to a position in the padded strip.
    pub fn select_slide(&mut self, extended_index: usize) -> bool {
        if self.is_transitioning {
            return false;
        }
        self.begin_transition(extended_index)
    }

    /// Jump to a real slide by its position in the slide list.
    pub fn select_dot(&mut self, logical: usize) -> bool {
        if logical >= self.slides.len() {
            return false;
        }
        self.select_slide(logical + self.padding)
    }

    fn begin_transition(&mut self, target: usize) -> bool {
        if target >= self.extended.len() {
            return false;
        }
        trace!("Carousel moving {} -> {}", self.current, target);
        self.current = target;
        self.is_animating = true;
        self.is_transitioning = true;
        self.settle_deadline = Some(Instant::now() + self.config.settle_delay);
        true
    }

    /// Settle if the pending transition's deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.settle_deadline {
            Some(deadline) if now >= deadline => {
                self.settle();
                true
            }
            _ => false,
        }
    }

    /// Finish the in-flight transition. If the strip landed on a clone, snap
    /// to the matching real slide without animating.
    pub fn settle(&mut self) {
        self.is_transitioning = false;
        self.settle_deadline = None;

        if !self.is_looping() {
            return;
        }

        let len = self.slides.len();
        let normalized = if self.current < self.padding {
            Some(self.current + len)
        } else if self.current >= len + self.padding {
            Some(self.current - len)
        } else {
            None
        };

        if let Some(index) = normalized {
            debug!("Carousel normalizing {} -> {}", self.current, index);
            self.is_animating = false;
            self.current = index;
        }
    }
}
