use crate::core::constants::FFT_SIZE;
use crate::core::spectrum::FrequencySource;
use web_sys as web;

/// WebAudio decode graph: `media source -> analyser -> destination`.
pub struct WebGraph {
    pub audio_ctx: web::AudioContext,
    pub source: web::MediaElementAudioSourceNode,
    pub analyser: web::AnalyserNode,
}

impl WebGraph {
    /// Resume a context the browser started suspended. Harmless when running.
    pub fn resume(&self) {
        if self.audio_ctx.state() == web::AudioContextState::Suspended {
            _ = self.audio_ctx.resume();
        }
    }
}

impl FrequencySource for WebGraph {
    fn frequency_bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn byte_frequency_data(&self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }
}

// Create analyser with the fixed FFT size
pub fn create_analyser(audio_ctx: &web::AudioContext) -> anyhow::Result<web::AnalyserNode> {
    let analyser =
        web::AnalyserNode::new(audio_ctx).map_err(|e| anyhow::anyhow!("AnalyserNode: {:?}", e))?;
    analyser.set_fft_size(FFT_SIZE);
    Ok(analyser)
}

/// Build the graph around `media`. Must only run once per page: a media
/// element can be bound to a source node a single time.
pub fn build_graph(media: &web::HtmlMediaElement) -> anyhow::Result<WebGraph> {
    let audio_ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("AudioContext: {:?}", e))?;
    let source = audio_ctx
        .create_media_element_source(media)
        .map_err(|e| anyhow::anyhow!("MediaElementSource: {:?}", e))?;
    let analyser = create_analyser(&audio_ctx)?;
    source
        .connect_with_audio_node(&analyser)
        .map_err(|e| anyhow::anyhow!("connect source: {:?}", e))?;
    analyser
        .connect_with_audio_node(&audio_ctx.destination())
        .map_err(|e| anyhow::anyhow!("connect analyser: {:?}", e))?;
    let graph = WebGraph {
        audio_ctx,
        source,
        analyser,
    };
    graph.resume();
    log::info!(
        "[audio] graph built: fft={} bins={}",
        FFT_SIZE,
        graph.frequency_bin_count()
    );
    Ok(graph)
}
