use crate::error::InputDeviceError;

/// A point in surface-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Nearest pixel, used by the rasterizer.
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchPoint {
    pub client_x: f32,
    pub client_y: f32,
}

/// Top-left corner of the surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceOrigin {
    pub left: f32,
    pub top: f32,
}

/// Input as delivered by the windowing layer, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPointerEvent {
    Mouse {
        offset_x: f32,
        offset_y: f32,
    },
    Touch {
        touches: Vec<TouchPoint>,
        changed_touches: Vec<TouchPoint>,
    },
}

impl RawPointerEvent {
    pub fn mouse(offset_x: f32, offset_y: f32) -> Self {
        Self::Mouse { offset_x, offset_y }
    }

    pub fn touch(client_x: f32, client_y: f32) -> Self {
        Self::Touch {
            touches: vec![TouchPoint { client_x, client_y }],
            changed_touches: Vec::new(),
        }
    }
}

/// Normalized pointer input. Both variants carry surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Mouse(StrokePoint),
    Touch(StrokePoint),
}

impl PointerInput {
    pub fn point(self) -> StrokePoint {
        match self {
            PointerInput::Mouse(point) | PointerInput::Touch(point) => point,
        }
    }
}

pub fn resolve_event_coordinates(
    event: &RawPointerEvent,
    origin: SurfaceOrigin,
) -> Result<PointerInput, InputDeviceError> {
    let input = match event {
        RawPointerEvent::Mouse { offset_x, offset_y } => {
            PointerInput::Mouse(StrokePoint::new(*offset_x, *offset_y))
        }
        RawPointerEvent::Touch {
            touches,
            changed_touches,
        } => {
            // touchend has no active touches left; the lifted finger is in
            // changed_touches.
            let touch = touches
                .first()
                .or_else(|| changed_touches.first())
                .ok_or(InputDeviceError::NoTouchPoints)?;
            PointerInput::Touch(StrokePoint::new(
                touch.client_x - origin.left,
                touch.client_y - origin.top,
            ))
        }
    };

    if !input.point().is_finite() {
        return Err(InputDeviceError::NonFiniteCoordinates);
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: SurfaceOrigin = SurfaceOrigin {
        left: 0.0,
        top: 64.0,
    };

    #[test]
    fn mouse_offset_is_used_directly() {
        let input = resolve_event_coordinates(&RawPointerEvent::mouse(12.0, 30.0), ORIGIN)
            .expect("mouse input");
        assert_eq!(input, PointerInput::Mouse(StrokePoint::new(12.0, 30.0)));
    }

    #[test]
    fn touch_subtracts_surface_origin() {
        let input = resolve_event_coordinates(&RawPointerEvent::touch(12.0, 94.0), ORIGIN)
            .expect("touch input");
        assert_eq!(input, PointerInput::Touch(StrokePoint::new(12.0, 30.0)));
    }

    #[test]
    fn mouse_and_touch_agree_on_the_same_spot() {
        let mouse = resolve_event_coordinates(&RawPointerEvent::mouse(40.0, 10.0), ORIGIN)
            .expect("mouse input");
        let touch = resolve_event_coordinates(&RawPointerEvent::touch(40.0, 74.0), ORIGIN)
            .expect("touch input");
        assert_eq!(mouse.point(), touch.point());
    }

    #[test]
    fn touch_end_falls_back_to_changed_touches() {
        let event = RawPointerEvent::Touch {
            touches: Vec::new(),
            changed_touches: vec![TouchPoint {
                client_x: 5.0,
                client_y: 70.0,
            }],
        };
        let input = resolve_event_coordinates(&event, ORIGIN).expect("changed touch");
        assert_eq!(input.point(), StrokePoint::new(5.0, 6.0));
    }

    #[test]
    fn touch_without_points_is_rejected() {
        let event = RawPointerEvent::Touch {
            touches: Vec::new(),
            changed_touches: Vec::new(),
        };
        assert_eq!(
            resolve_event_coordinates(&event, ORIGIN),
            Err(InputDeviceError::NoTouchPoints)
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert_eq!(
            resolve_event_coordinates(&RawPointerEvent::mouse(f32::NAN, 1.0), ORIGIN),
            Err(InputDeviceError::NonFiniteCoordinates)
        );
    }
}
