use super::{check_request, SpeechBackend};
use crate::catalog::Catalog;
use crate::config_loader::Settings;
use crate::error::{NarrationError, Result};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

const BACKEND: &str = "espeak-ng";

const VARIANTS: &[(&str, &str)] = &[
    ("f1", "Female 1"),
    ("f2", "Female 2"),
    ("f3", "Female 3"),
    ("f4", "Female 4"),
    ("m1", "Male 1"),
    ("m2", "Male 2"),
    ("m3", "Male 3"),
    ("m4", "Male 4"),
];

const LANGUAGES: &[(&str, &str)] = &[
    ("ca", "Catalan"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
];

/// Local eSpeak NG engine. Works offline; writes 22 kHz WAV to stdout.
pub struct EspeakBackend {
    binary: String,
    timeout: Duration,
    voices: Catalog,
    languages: Catalog,
}

impl EspeakBackend {
    pub fn new(binary: &str, timeout: Duration) -> Self {
        Self {
            binary: binary.to_string(),
            timeout,
            voices: Catalog::from_pairs(VARIANTS.iter().copied()),
            languages: Catalog::from_pairs(LANGUAGES.iter().copied()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.espeak_binary, settings.request_timeout())
    }

    fn failure(reason: impl Into<String>) -> NarrationError {
        NarrationError::Synthesis {
            backend: BACKEND,
            reason: reason.into(),
        }
    }
}

impl SpeechBackend for EspeakBackend {
    fn id(&self) -> &'static str {
        BACKEND
    }

    fn list_voices(&self) -> &Catalog {
        &self.voices
    }

    fn list_languages(&self) -> &Catalog {
        &self.languages
    }

    fn synthesize(&self, voice: &str, text: &str, language: &str) -> Result<Vec<u8>> {
        check_request(self, voice, text, language)?;

        let mut child = Command::new(&self.binary)
            .arg("-v")
            .arg(format!("{}+{}", language, voice))
            .arg("--stdout")
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::failure(format!("could not start {}: {}", self.binary, e)))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) = (stdin, stdout, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Self::failure("engine pipes were not captured"));
        };

        // Every pipe gets its own thread so the engine can interleave reading
        // and writing without either side blocking the timeout below.
        // Text goes through stdin so it can never be parsed as a flag.
        let input = format!("{}\n", text.trim());
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });
        let errors = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        });

        let status = match child
            .wait_timeout(self.timeout)
            .map_err(|e| Self::failure(e.to_string()))?
        {
            Some(status) => status,
            None => {
                warn!(timeout = ?self.timeout, "eSpeak: synthesis timed out, killing process");
                let _ = child.kill();
                let _ = child.wait();
                // A grandchild may still hold the pipes, so the pipe threads are left detached
                return Err(NarrationError::Timeout { backend: BACKEND });
            }
        };

        // A broken pipe means the engine exited before reading everything; its status says why
        match writer.join() {
            Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(Self::failure(e.to_string()));
            }
            Err(_) => return Err(Self::failure("stdin writer panicked")),
            _ => {}
        }

        let audio = reader
            .join()
            .map_err(|_| Self::failure("stdout reader panicked"))?
            .map_err(|e| Self::failure(e.to_string()))?;
        let stderr = errors.join().unwrap_or_default();

        if !status.success() {
            return Err(Self::failure(format!("{}: {}", status, stderr.trim())));
        }

        if audio.is_empty() {
            return Err(NarrationError::EmptyResponse { backend: BACKEND });
        }

        debug!(voice, language, bytes = audio.len(), "eSpeak: synthesized clip");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serial_test::serial;

    #[test]
    fn test_catalogs_are_stable() {
        let backend = EspeakBackend::new("espeak-ng", Duration::from_secs(5));
        assert_eq!(backend.list_voices(), backend.list_voices());
        assert_eq!(backend.list_languages(), backend.list_languages());
        assert_eq!(backend.list_voices().display_name("f3"), Some("Female 3"));
    }

    #[test]
    #[serial(engine)]
    fn test_missing_binary_is_a_backend_failure() {
        let backend = EspeakBackend::new("/nonexistent/espeak-ng", Duration::from_secs(5));
        let err = backend.synthesize("f3", "Hola", "es").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Backend);
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let backend = EspeakBackend::new("espeak-ng", Duration::from_secs(5));
        let err = backend.synthesize("Aaron Dreschner", "Hola", "es").unwrap_err();
        assert_eq!(err.kind(), FailureKind::CapabilityMismatch);
    }

    #[cfg(unix)]
    #[test]
    #[serial(engine)]
    fn test_silent_engine_output_is_rejected() {
        // `true` ignores its arguments and writes nothing
        let backend = EspeakBackend::new("true", Duration::from_secs(5));
        let err = backend.synthesize("m1", "Hello", "en").unwrap_err();
        assert!(matches!(err, NarrationError::EmptyResponse { .. }));
    }

    #[cfg(unix)]
    #[test]
    #[serial(engine)]
    fn test_hung_engine_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-espeak");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 10\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let backend = EspeakBackend::new(script.to_str().unwrap(), Duration::from_millis(200));
        let err = backend.synthesize("m1", "Hello", "en").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[cfg(unix)]
    fn fake_engine(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let script = dir.join("fake-espeak");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[test]
    #[serial(engine)]
    fn test_engine_writing_before_reading_input_does_not_deadlock() {
        let dir = tempfile::tempdir().unwrap();
        // Fills the stdout pipe before touching stdin
        let engine = fake_engine(dir.path(), "head -c 300000 /dev/zero\ncat >/dev/null");
        let text = "hola ".repeat(60_000);

        let backend = EspeakBackend::new(&engine, Duration::from_secs(10));
        let audio = backend.synthesize("m1", &text, "es").unwrap();
        assert_eq!(audio.len(), 300_000);
    }

    #[cfg(unix)]
    #[test]
    #[serial(engine)]
    fn test_flooding_engine_that_stops_reading_still_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(dir.path(), "head -c 300000 /dev/zero\nsleep 10");
        let text = "hola ".repeat(60_000);

        let backend = EspeakBackend::new(&engine, Duration::from_millis(500));
        let started = std::time::Instant::now();
        let err = backend.synthesize("m1", &text, "es").unwrap_err();

        assert_eq!(err.kind(), FailureKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    #[serial(engine)]
    fn test_engine_failure_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(dir.path(), "echo 'unknown voice' >&2\nexit 3");

        let backend = EspeakBackend::new(&engine, Duration::from_secs(5));
        let err = backend.synthesize("m1", "Hello", "en").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Backend);
        assert!(err.to_string().contains("unknown voice"));
    }
}
