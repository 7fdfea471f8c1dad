//! Trackbar panel for live detector tuning
//!
//! The panel is polled: trackbars carry no callbacks, the loop reads every
//! position once per frame. Only fields whose trackbar moved since the last
//! poll are written back, so values a trackbar cannot show (fractional arc
//! lengths, values past the trackbar limit) survive until touched.

use opencv::highgui;

use crate::constants::trackbar as limits;
use crate::{CalibrationError, DetectorConfig, Result};

/// Trackbar names in panel order, with their upper limits
const TRACKBARS: [(&str, i32); 17] = [
    ("lh", limits::HSV_MAX),
    ("uh", limits::HSV_MAX),
    ("ls", limits::HSV_MAX),
    ("us", limits::HSV_MAX),
    ("lv", limits::HSV_MAX),
    ("uv", limits::HSV_MAX),
    ("inversion", 1),
    ("blur_kernel", limits::KERNEL_MAX),
    ("dilation_kernel", limits::KERNEL_MAX),
    ("erosion_kernel", limits::KERNEL_MAX),
    ("n_dilations", limits::ITERATIONS_MAX),
    ("n_erosions", limits::ITERATIONS_MAX),
    ("n_objects", limits::N_OBJECTS_MAX),
    ("min_arc_length", limits::ARC_LENGTH_MAX),
    ("max_arc_length", limits::ARC_LENGTH_MAX),
    ("roi_width", limits::PERCENT_MAX),
    ("roi_height", limits::PERCENT_MAX),
];

/// Integer trackbar positions, in `TRACKBARS` order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackbarPositions([i32; 17]);

impl TrackbarPositions {
    /// Positions representing `config`; ROI fractions become percentages
    pub fn from_config(config: &DetectorConfig) -> Self {
        let [lh, ls, lv] = config.lower_bound;
        let [uh, us, uv] = config.upper_bound;
        Self([
            lh,
            uh,
            ls,
            us,
            lv,
            uv,
            config.inversion as i32,
            config.blur_kernel,
            config.dilation_kernel,
            config.erosion_kernel,
            config.n_dilations,
            config.n_erosions,
            config.n_objects.min(i32::MAX as usize) as i32,
            config.min_arc_length.round() as i32,
            config.max_arc_length.round() as i32,
            (config.roi[0] * 100.0).round() as i32,
            (config.roi[1] * 100.0).round() as i32,
        ])
    }

    /// Positions limited to each trackbar's range, as the panel shows them
    pub fn clamped(&self) -> Self {
        let mut values = self.0;
        for (value, (_, max)) in values.iter_mut().zip(TRACKBARS.iter()) {
            *value = (*value).clamp(0, *max);
        }
        Self(values)
    }

    /// Copy into `config` every field whose trackbar differs from `previous`;
    /// returns whether anything changed
    pub fn apply_changes(&self, previous: &TrackbarPositions, config: &mut DetectorConfig) -> bool {
        let moved = self.to_config();
        let mut changed = false;
        for (index, (now, before)) in self.0.iter().zip(previous.0).enumerate() {
            if *now == before {
                continue;
            }
            changed = true;
            match index {
                0 => config.lower_bound[0] = moved.lower_bound[0],
                1 => config.upper_bound[0] = moved.upper_bound[0],
                2 => config.lower_bound[1] = moved.lower_bound[1],
                3 => config.upper_bound[1] = moved.upper_bound[1],
                4 => config.lower_bound[2] = moved.lower_bound[2],
                5 => config.upper_bound[2] = moved.upper_bound[2],
                6 => config.inversion = moved.inversion,
                7 => config.blur_kernel = moved.blur_kernel,
                8 => config.dilation_kernel = moved.dilation_kernel,
                9 => config.erosion_kernel = moved.erosion_kernel,
                10 => config.n_dilations = moved.n_dilations,
                11 => config.n_erosions = moved.n_erosions,
                12 => config.n_objects = moved.n_objects,
                13 => config.min_arc_length = moved.min_arc_length,
                14 => config.max_arc_length = moved.max_arc_length,
                15 => config.roi[0] = moved.roi[0],
                16 => config.roi[1] = moved.roi[1],
                _ => {}
            }
        }
        changed
    }

    /// Configuration described by these positions
    pub fn to_config(&self) -> DetectorConfig {
        let [lh, uh, ls, us, lv, uv, inversion, blur, dilation, erosion, n_dil, n_ero, n_obj, min_arc, max_arc, roi_w, roi_h] =
            self.0;
        DetectorConfig {
            inversion: inversion != 0,
            blur_kernel: blur,
            n_dilations: n_dil,
            dilation_kernel: dilation,
            n_erosions: n_ero,
            erosion_kernel: erosion,
            n_objects: n_obj.max(0) as usize,
            min_arc_length: min_arc as f64,
            max_arc_length: max_arc as f64,
            roi: [roi_w as f64 / 100.0, roi_h as f64 / 100.0],
            lower_bound: [lh, ls, lv],
            upper_bound: [uh, us, uv],
        }
    }
}

/// HighGUI window holding one trackbar per detector parameter
#[derive(Debug, Clone)]
pub struct TuningPanel {
    window: String,
    last: TrackbarPositions,
}

impl TuningPanel {
    /// Create the panel window and set the trackbars from `config`
    pub fn create(window: &str, config: &DetectorConfig) -> Result<Self> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| CalibrationError::opencv("Creating tuning window", e))?;

        let positions = TrackbarPositions::from_config(config).clamped();
        for ((name, max), value) in TRACKBARS.iter().zip(positions.0) {
            highgui::create_trackbar(name, window, None, *max, None)
                .map_err(|e| CalibrationError::opencv(format!("Creating trackbar {}", name), e))?;
            highgui::set_trackbar_pos(name, window, value)
                .map_err(|e| CalibrationError::opencv(format!("Setting trackbar {}", name), e))?;
        }

        Ok(Self {
            window: window.to_string(),
            last: positions,
        })
    }

    pub fn window(&self) -> &str {
        &self.window
    }

    /// Read every trackbar
    pub fn positions(&self) -> Result<TrackbarPositions> {
        let mut values = [0i32; 17];
        for (slot, (name, _)) in values.iter_mut().zip(TRACKBARS.iter()) {
            *slot = highgui::get_trackbar_pos(name, &self.window)
                .map_err(|e| CalibrationError::opencv(format!("Reading trackbar {}", name), e))?;
        }
        Ok(TrackbarPositions(values))
    }

    /// Apply trackbars moved since the last poll to `config`; returns
    /// whether `config` changed
    pub fn poll(&mut self, config: &mut DetectorConfig) -> Result<bool> {
        let current = self.positions()?;
        let changed = current.apply_changes(&self.last, config);
        self.last = current;
        Ok(changed)
    }
}
