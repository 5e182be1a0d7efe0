use crate::gain::db_to_linear;

/// `tanh` waveshaper preceded by `drive_db` of input gain. Output stays in (-1, 1).
#[derive(Clone, Copy, Debug)]
pub struct TanhDrive {
    drive: f32,
}

impl TanhDrive {
    pub fn new(drive_db: f32) -> Self {
        Self {
            drive: db_to_linear(drive_db.max(0.0)),
        }
    }

    #[inline]
    pub fn process(&self, input: f32) -> f32 {
        (input * self.drive).tanh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tanh_drive_is_bounded() {
        let drive = TanhDrive::new(40.0);
        for x in [-10.0f32, -1.0, -0.1, 0.0, 0.1, 1.0, 10.0] {
            assert!(drive.process(x).abs() <= 1.0);
        }
    }
}
