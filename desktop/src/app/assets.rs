use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::FontVec;
use ninesweep_core::Notification;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("could not read asset {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no audio output available")]
    Audio(#[from] rodio::StreamError),
    #[error("could not decode image {path}: {message}")]
    Image { path: PathBuf, message: String },
    #[error("could not load font {path}")]
    Font {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

/// One sound effect per kind of notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(in crate::app) enum Sound {
    Number,
    Boom,
    Flag,
    Over,
    Win,
}

impl Sound {
    const ALL: [Sound; 5] = [Self::Number, Self::Boom, Self::Flag, Self::Over, Self::Win];

    pub(in crate::app) const fn file_name(self) -> &'static str {
        use Sound::*;
        match self {
            Number => "number.mp3",
            Boom => "boom.mp3",
            Flag => "flag.mp3",
            Over => "over.mp3",
            Win => "win.mp3",
        }
    }

    pub(in crate::app) const fn for_notification(notification: Notification) -> Self {
        match notification {
            Notification::CellRevealed(_) => Self::Number,
            Notification::MineExploded(_) => Self::Boom,
            Notification::GameOver => Self::Over,
            Notification::FlagToggled(_) => Self::Flag,
            Notification::Won => Self::Win,
        }
    }
}

fn read_asset(path: &Path) -> Result<Vec<u8>, AssetError> {
    std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Output stream plus the encoded clips, decoded again on every play.
pub(in crate::app) struct Audio {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clips: HashMap<Sound, Arc<[u8]>>,
    volume: f32,
}

impl Audio {
    fn open(config: &AppConfig) -> Result<Self, AssetError> {
        let (stream, handle) = OutputStream::try_default()?;

        let mut clips: HashMap<Sound, Arc<[u8]>> = HashMap::new();
        for sound in Sound::ALL {
            let path = config.asset_path(sound.file_name());
            match read_asset(&path) {
                Ok(bytes) => {
                    clips.insert(sound, Arc::from(bytes));
                }
                Err(err) => log::warn!("{}, {:?} will be silent", err, sound),
            }
        }

        Ok(Self {
            _stream: stream,
            handle,
            clips,
            volume: config.volume,
        })
    }

    fn play(&self, sound: Sound) {
        let Some(clip) = self.clips.get(&sound) else {
            return;
        };
        let Ok(sink) = Sink::try_new(&self.handle) else {
            log::warn!("could not open a sink for {:?}", sound);
            return;
        };
        match Decoder::new(Cursor::new(Arc::clone(clip))) {
            Ok(source) => {
                sink.set_volume(self.volume);
                sink.append(source);
                sink.detach();
            }
            Err(err) => log::warn!("could not decode {}: {}", sound.file_name(), err),
        }
    }
}

/// Everything the renderer draws that does not come from the board.
#[derive(Default)]
pub(in crate::app) struct Sprites {
    pub(in crate::app) boom: Option<Pixmap>,
    pub(in crate::app) font: Option<FontVec>,
}

impl Sprites {
    const BOOM_FILE: &'static str = "boomm.png";

    fn load(config: &AppConfig) -> Self {
        let boom = Self::load_png(&config.asset_path(Self::BOOM_FILE))
            .map_err(|err| log::warn!("{}, mines are drawn as plain discs", err))
            .ok();
        let font = Self::load_font(&config.font_path())
            .map_err(|err| log::warn!("{}, text is not drawn", err))
            .ok();
        Self { boom, font }
    }

    fn load_png(path: &Path) -> Result<Pixmap, AssetError> {
        let bytes = read_asset(path)?;
        Pixmap::decode_png(&bytes).map_err(|err| AssetError::Image {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn load_font(path: &Path) -> Result<FontVec, AssetError> {
        let bytes = read_asset(path)?;
        FontVec::try_from_vec(bytes).map_err(|source| AssetError::Font {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Handles acquired once at start-up and released when dropped at shutdown.
/// Anything that fails to load is left out and the game runs without it.
#[derive(Default)]
pub struct Assets {
    audio: Option<Audio>,
    pub(in crate::app) sprites: Sprites,
}

impl Assets {
    pub fn load(config: &AppConfig) -> Self {
        log::info!("loading assets from {}", config.asset_dir.display());
        let audio = Audio::open(config)
            .map_err(|err| log::warn!("{}, running without sound", err))
            .ok();
        Self {
            audio,
            sprites: Sprites::load(config),
        }
    }

    /// No sound and nothing to draw beyond plain shapes.
    #[cfg(test)]
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Plays one frame's notifications, each distinct sound at most once so a
    /// flood fill does not stack dozens of copies. Returns how many sounds were due.
    pub(in crate::app) fn play_all(&self, notifications: impl IntoIterator<Item = Notification>) -> usize {
        let mut due = Vec::with_capacity(Sound::ALL.len());
        for notification in notifications {
            let sound = Sound::for_notification(notification);
            if due.contains(&sound) {
                continue;
            }
            due.push(sound);
            if let Some(audio) = &self.audio {
                audio.play(sound);
            }
        }
        due.len()
    }
}
