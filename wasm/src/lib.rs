use magswipe_core::resample::f32_to_i16;
use magswipe_core::{Direction, SwipeDecode, Track2Decoder, Track2Encoder};
use wasm_bindgen::prelude::*;

/// Outcome of decoding one swipe, exposed to JavaScript as plain getters
#[wasm_bindgen]
pub struct WasmDecodeResult {
    success: bool,
    data: String,
    error: Option<String>,
    code: i32,
    reversed: bool,
}

#[wasm_bindgen]
impl WasmDecodeResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Decoded text, or the partial text read before a failure
    #[wasm_bindgen(getter)]
    pub fn data(&self) -> String {
        self.data.clone()
    }

    /// Diagnostic name such as `LRC_INVALID`, undefined on success
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Whether the reversed buffer produced this result
    #[wasm_bindgen(getter)]
    pub fn reversed(&self) -> bool {
        self.reversed
    }
}

impl From<SwipeDecode> for WasmDecodeResult {
    fn from(swipe: SwipeDecode) -> Self {
        let kind = swipe.report.error_kind();
        Self {
            success: swipe.report.is_success(),
            data: swipe.report.text().to_string(),
            error: kind.map(|k| k.name().to_string()),
            code: kind.map_or(0, |k| k.code()),
            reversed: swipe.direction == Direction::Reverse,
        }
    }
}

#[wasm_bindgen]
pub struct WasmDecoder {
    inner: Track2Decoder,
}

#[wasm_bindgen]
impl WasmDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmDecoder {
        WasmDecoder {
            inner: Track2Decoder::new(),
        }
    }

    /// Decode 16-bit PCM at 44.1 kHz, retrying reversed on failure
    /// Takes an Int16Array
    #[wasm_bindgen]
    pub fn decode(&self, samples: &[i16]) -> WasmDecodeResult {
        self.inner.decode_bidirectional(samples).into()
    }

    /// Decode Web Audio samples in [-1.0, 1.0] at 44.1 kHz
    /// Takes a Float32Array
    #[wasm_bindgen(js_name = decodeFloat)]
    pub fn decode_float(&self, samples: &[f32]) -> WasmDecodeResult {
        self.inner.decode_bidirectional(&f32_to_i16(samples)).into()
    }
}

impl Default for WasmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Synthesize a swipe of `data` (without sentinels) as 16-bit PCM
#[wasm_bindgen(js_name = encodeSwipe)]
pub fn encode_swipe(data: &str) -> Result<Vec<i16>, JsValue> {
    Track2Encoder::new()
        .encode(data)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
