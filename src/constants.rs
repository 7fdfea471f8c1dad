//! Defaults, drawing colors and operator key codes
//!
//! Grouped the same way the tuning and calibration tools use them: detector
//! defaults, arm defaults, frame geometry, overlay styling and keys.

/// Detector parameter defaults for an orange target under indoor light
pub mod detector {
    pub const INVERSION: bool = false;
    pub const BLUR_KERNEL: i32 = 23;
    pub const N_DILATIONS: i32 = 3;
    pub const DILATION_KERNEL: i32 = 3;
    pub const N_EROSIONS: i32 = 3;
    pub const EROSION_KERNEL: i32 = 3;
    pub const N_OBJECTS: usize = 5;
    pub const MIN_ARC_LENGTH: f64 = 100.0;
    pub const MAX_ARC_LENGTH: f64 = 1500.0;

    /// ROI width and height as fractions of the frame
    pub const ROI: [f64; 2] = [0.8, 0.8];

    /// HSV lower bound (OpenCV ranges: H 0-179, S and V 0-255)
    pub const LOWER_BOUND: [i32; 3] = [7, 50, 63];
    pub const UPPER_BOUND: [i32; 3] = [21, 155, 255];

    /// Smallest kernel accepted by the morphological operators
    pub const MIN_KERNEL_SIZE: i32 = 3;
}

/// Arm defaults
pub mod arm {
    /// Home pose (x, y, z, r) in arm coordinates, millimetres and degrees
    pub const HOME_POSE: [f64; 4] = [220.0, 0.0, 135.0, 9.0];

    /// Jog step per key press (x, y, z in millimetres, r in degrees)
    pub const JOG_STEP: [f64; 4] = [5.0, 5.0, 5.0, 3.0];
}

/// Working frame geometry
pub mod frame {
    pub const WIDTH: i32 = 640;
    pub const HEIGHT: i32 = 480;
}

/// Trackbar upper limits for the tuning panel
pub mod trackbar {
    pub const HSV_MAX: i32 = 255;
    pub const KERNEL_MAX: i32 = 41;
    pub const ITERATIONS_MAX: i32 = 20;
    pub const N_OBJECTS_MAX: i32 = 10;
    pub const ARC_LENGTH_MAX: i32 = 3000;
    pub const PERCENT_MAX: i32 = 100;
}

/// BGR colors used for annotations
pub mod colors {
    pub const ROI: [f64; 3] = [255.0, 0.0, 0.0];
    pub const BOX: [f64; 3] = [0.0, 255.0, 0.0];
    pub const LABEL: [f64; 3] = [0.0, 0.0, 255.0];
    pub const STATUS: [f64; 3] = [0.0, 255.0, 215.0];
}

/// Key codes returned by `highgui::wait_key`
pub mod keys {
    pub const SPACE: i32 = 32;
    pub const ESCAPE: i32 = 27;
    pub const CANCEL: i32 = b'c' as i32;
    pub const SAVE_CONFIG: i32 = b's' as i32;
    pub const GO_HOME: i32 = b'h' as i32;
    pub const RESET_HOME: i32 = b'r' as i32;
    pub const QUIT: i32 = b'q' as i32;

    /// Jog keys as (key, axis, direction); axes are x, y, z, r
    pub const JOG: [(i32, usize, i8); 8] = [
        (b'i' as i32, 0, 1),
        (b'k' as i32, 0, -1),
        (b'j' as i32, 1, 1),
        (b'l' as i32, 1, -1),
        (b'u' as i32, 2, 1),
        (b'o' as i32, 2, -1),
        (b'n' as i32, 3, 1),
        (b'm' as i32, 3, -1),
    ];
}
