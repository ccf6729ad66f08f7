// Wall-clock timing that works both in the browser and natively.
// `std::time::Instant` panics on wasm32-unknown-unknown, so the browser clock is used there.

#[cfg(target_arch = "wasm32")]
pub struct Stopwatch {
    started_ms: f64,
}

#[cfg(target_arch = "wasm32")]
impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch { started_ms: js_sys::Date::now() }
    }

    pub fn elapsed_ms(&self) -> f64 {
        js_sys::Date::now() - self.started_ms
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub struct Stopwatch {
    started: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch { started: std::time::Instant::now() }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::Stopwatch;

    #[test]
    fn elapsed_is_monotonic() {
        let watch = Stopwatch::start();
        let first = watch.elapsed_ms();
        let second = watch.elapsed_ms();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
