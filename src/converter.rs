//! Pipeline orchestration
//!
//! A [`Converter`] runs one job at a time through
//! `Idle -> Extracting -> Building -> Packaging -> (Signing -> Verifying)? -> Done | Failed`.
//! Stage errors never escape: every operation returns a [`ConversionResult`]
//! carrying the error kind, the message and the full transcript.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::bundle::{archive, descriptor, module, BundleConfig, Extractor, Workspace};
use crate::config::Settings;
use crate::error::{ConvertError, ErrorKind};
use crate::progress::{ProgressSink, Transcript};
use crate::signing::{CertificateInfo, KeystoreProvisioner, Signer};
use crate::utils::paths;

/// One user-triggered conversion
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Sign the produced bundle with this identity
    pub certificate: Option<CertificateInfo>,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            certificate: None,
        }
    }

    pub fn with_certificate(mut self, certificate: CertificateInfo) -> Self {
        self.certificate = Some(certificate);
        self
    }
}

/// Final outcome of a job
#[derive(Debug)]
pub struct ConversionResult {
    success: bool,
    message: String,
    output_path: Option<PathBuf>,
    logs: Vec<String>,
    error: Option<ConvertError>,
}

impl ConversionResult {
    fn succeeded(message: impl Into<String>, output_path: PathBuf, logs: Vec<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output_path: Some(output_path),
            logs,
            error: None,
        }
    }

    fn failed(error: ConvertError, logs: Vec<String>) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            output_path: None,
            logs,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Set only on success
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Ordered transcript of the job
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn error(&self) -> Option<&ConvertError> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ConvertError::kind)
    }
}

/// Where the current (or last) job is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Extracting,
    Building,
    Packaging,
    Signing,
    Verifying,
    Done,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Idle => "idle",
            JobState::Extracting => "extracting",
            JobState::Building => "building",
            JobState::Packaging => "packaging",
            JobState::Signing => "signing",
            JobState::Verifying => "verifying",
            JobState::Done => "done",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// APK to AAB pipeline
///
/// At most one job runs at a time; a job submitted while another is in
/// flight fails immediately with [`ErrorKind::Busy`].
pub struct Converter {
    settings: Settings,
    extractor: Extractor,
    provisioner: KeystoreProvisioner,
    active: tokio::sync::Mutex<()>,
    state: Mutex<JobState>,
}

impl Converter {
    pub fn new(settings: Settings) -> Self {
        Self {
            extractor: Extractor::new(&settings),
            provisioner: KeystoreProvisioner::new(&settings),
            settings,
            active: tokio::sync::Mutex::new(()),
            state: Mutex::new(JobState::Idle),
        }
    }

    pub fn state(&self) -> JobState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: JobState) {
        log::debug!("Job state: {}", state);
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    /// Convert, then sign if the job names a certificate
    pub async fn run(
        &self,
        job: &ConversionJob,
        progress: Arc<dyn ProgressSink>,
    ) -> ConversionResult {
        match &job.certificate {
            Some(certificate) => self.convert_and_sign(job, certificate, progress).await,
            None => self.convert(job, progress).await,
        }
    }

    /// Produce an unsigned bundle at `job.output`
    pub async fn convert(
        &self,
        job: &ConversionJob,
        progress: Arc<dyn ProgressSink>,
    ) -> ConversionResult {
        let Ok(_guard) = self.active.try_lock() else {
            return ConversionResult::failed(ConvertError::Busy, Vec::new());
        };
        let transcript = Transcript::new(progress);

        let outcome = self.convert_inner(job, &transcript).await;
        self.finish(outcome, "APK converted to AAB successfully", &transcript)
    }

    /// Convert, then sign and verify the output in place
    ///
    /// A conversion failure skips signing. A signing or verification
    /// failure fails the whole job but leaves the unsigned output on disk.
    pub async fn convert_and_sign(
        &self,
        job: &ConversionJob,
        certificate: &CertificateInfo,
        progress: Arc<dyn ProgressSink>,
    ) -> ConversionResult {
        let Ok(_guard) = self.active.try_lock() else {
            return ConversionResult::failed(ConvertError::Busy, Vec::new());
        };
        let transcript = Transcript::new(progress);

        let outcome = match self.convert_inner(job, &transcript).await {
            Ok(output) => self
                .sign_inner(&output, certificate, &transcript)
                .await
                .map(|()| output),
            Err(e) => Err(e),
        };
        self.finish(outcome, "APK converted to AAB and signed successfully", &transcript)
    }

    /// Sign and verify an existing bundle in place
    pub async fn sign(
        &self,
        bundle: &Path,
        certificate: &CertificateInfo,
        progress: Arc<dyn ProgressSink>,
    ) -> ConversionResult {
        let Ok(_guard) = self.active.try_lock() else {
            return ConversionResult::failed(ConvertError::Busy, Vec::new());
        };
        let transcript = Transcript::new(progress);

        let outcome = if bundle.is_file() {
            self.sign_inner(bundle, certificate, &transcript)
                .await
                .map(|()| bundle.to_path_buf())
        } else {
            Err(ConvertError::not_found("AAB file", bundle))
        };
        self.finish(outcome, "AAB signed successfully", &transcript)
    }

    fn finish(
        &self,
        outcome: Result<PathBuf, ConvertError>,
        success_message: &str,
        transcript: &Transcript,
    ) -> ConversionResult {
        match outcome {
            Ok(output) => {
                self.set_state(JobState::Done);
                transcript.report(success_message);
                ConversionResult::succeeded(success_message, output, transcript.lines())
            }
            Err(e) => {
                self.set_state(JobState::Failed);
                log::debug!("Job failed: {}", e);
                transcript.report(format!("Error: {}", e));
                ConversionResult::failed(e, transcript.lines())
            }
        }
    }

    async fn convert_inner(
        &self,
        job: &ConversionJob,
        transcript: &Transcript,
    ) -> Result<PathBuf, ConvertError> {
        if !job.input.is_file() {
            return Err(ConvertError::not_found("Input APK", &job.input));
        }
        transcript.report("Starting APK to AAB conversion...");

        let workspace = Workspace::create(&self.settings.workspace_root())?;
        let result = self.convert_in(&workspace, job, transcript).await;
        workspace.close();
        result
    }

    async fn convert_in(
        &self,
        workspace: &Workspace,
        job: &ConversionJob,
        transcript: &Transcript,
    ) -> Result<PathBuf, ConvertError> {
        self.set_state(JobState::Extracting);
        transcript.report("Extracting APK contents...");
        let extracted = workspace.extract_dir();
        self.extractor
            .extract(&job.input, &extracted, transcript)
            .await?;

        self.set_state(JobState::Building);
        transcript.report("Building base module...");
        let config = BundleConfig::universal();
        let stored = if self.settings.package.honor_uncompressed_glob {
            config.uncompressed_patterns()?
        } else {
            Vec::new()
        };
        let bundle_dir = workspace.bundle_dir();
        {
            let bundle_dir = bundle_dir.clone();
            let transcript = transcript.clone();
            blocking(move || {
                let summary = module::build_base_module(&extracted, &bundle_dir, &transcript)?;
                let copied: Vec<String> = summary.copied.iter().map(ToString::to_string).collect();
                log::debug!("Base module built from: {}", copied.join(", "));
                descriptor::write_bundle_config(&bundle_dir, &config)?;
                transcript.report(format!("Generated {}", descriptor::BUNDLE_CONFIG_FILE));
                Ok(())
            })
            .await?;
        }
        workspace.discard_extracted();

        self.set_state(JobState::Packaging);
        transcript.report("Packaging bundle...");
        let unsigned = workspace.unsigned_archive();
        let files = {
            let unsigned = unsigned.clone();
            blocking(move || archive::create_archive(&bundle_dir, &unsigned, &stored)).await?
        };
        log::debug!("Packaged {} files into {}", files, unsigned.display());

        paths::ensure_parent(&job.output)?;
        std::fs::copy(&unsigned, &job.output).map_err(|e| {
            ConvertError::io(
                format!("Failed to write bundle to {}", job.output.display()),
                e,
            )
        })?;
        transcript.report(format!("Bundle written to {}", job.output.display()));
        Ok(job.output.clone())
    }

    async fn sign_inner(
        &self,
        bundle: &Path,
        certificate: &CertificateInfo,
        transcript: &Transcript,
    ) -> Result<(), ConvertError> {
        self.set_state(JobState::Signing);
        transcript.report("Signing AAB file...");
        let signer = Signer::locate(&self.settings.tools)?;
        let keystore = self.provisioner.provision(certificate, transcript).await?;
        signer.sign(bundle, &keystore, transcript).await?;

        self.set_state(JobState::Verifying);
        transcript.report("Verifying signature...");
        signer.verify(bundle, transcript).await
    }
}

/// Run blocking file-system work off the async workers
async fn blocking<T, F>(f: F) -> Result<T, ConvertError>
where
    F: FnOnce() -> Result<T, ConvertError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ConvertError::IoFailure {
            message: format!("Background task failed: {}", e),
            source: None,
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractMethod;
    use crate::progress::NullProgress;
    use crate::testutil::{archive_entries, entry_compression, write_sample_apk, write_zip};
    use zip::CompressionMethod;

    struct Fixture {
        temp: tempfile::TempDir,
        work: PathBuf,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = tempfile::tempdir().unwrap();
            let work = temp.path().join("work");
            std::fs::create_dir_all(&work).unwrap();
            let mut settings = Settings::default();
            settings.extract.method = ExtractMethod::Builtin;
            settings.workspace.root = Some(work.clone());
            settings.signing.debug_keystore =
                Some(temp.path().join("home/.android/debug.keystore"));
            settings.signing.lock_timeout_secs = 10;
            settings.tools.timeout_secs = 30;
            Self { temp, work, settings }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.temp.path().join(rel)
        }

        fn converter(&self) -> Converter {
            Converter::new(self.settings.clone())
        }

        fn workspace_is_clean(&self) -> bool {
            std::fs::read_dir(&self.work).unwrap().next().is_none()
        }
    }

    fn null() -> Arc<dyn ProgressSink> {
        Arc::new(NullProgress)
    }

    #[tokio::test]
    async fn test_concrete_scenario() {
        let fx = Fixture::new();
        let apk = fx.path("app.apk");
        let aab = fx.path("out/app.aab");
        write_sample_apk(&apk);

        let converter = fx.converter();
        assert_eq!(converter.state(), JobState::Idle);
        let result = converter.convert(&ConversionJob::new(&apk, &aab), null()).await;

        assert!(result.is_success(), "{}", result.message());
        assert_eq!(result.output_path(), Some(aab.as_path()));
        assert_eq!(converter.state(), JobState::Done);

        let entries = archive_entries(&aab);
        for expected in [
            "BundleConfig.pb.json",
            "base/manifest/AndroidManifest.xml",
            "base/dex/classes.dex",
            "base/res/layout/activity_main.xml",
            "base/res/drawable-hdpi/icon.png",
            "base/root/resources.arsc",
            "base/root/",
        ] {
            assert!(entries.iter().any(|e| e == expected), "missing {}", expected);
        }
        assert!(fx.workspace_is_clean());
        assert!(result.logs().iter().any(|l| l == "Copied 1 dex file(s)"));
    }

    #[tokio::test]
    async fn test_progress_sink_sees_transcript_in_order() {
        let fx = Fixture::new();
        let apk = fx.path("app.apk");
        write_sample_apk(&apk);
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            Arc::new(move |msg: &str| seen.lock().unwrap().push(msg.to_string()))
        };

        let result = fx
            .converter()
            .convert(&ConversionJob::new(&apk, fx.path("app.aab")), sink)
            .await;

        assert!(result.is_success());
        assert_eq!(*seen.lock().unwrap(), result.logs());
        assert_eq!(result.logs()[0], "Starting APK to AAB conversion...");
    }

    #[tokio::test]
    async fn test_missing_input_is_not_found_and_writes_nothing() {
        let fx = Fixture::new();
        let aab = fx.path("missing.aab");

        let converter = fx.converter();
        let result = converter
            .convert(&ConversionJob::new(fx.path("missing.apk"), &aab), null())
            .await;

        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
        assert!(result.output_path().is_none());
        assert!(!aab.exists());
        assert_eq!(converter.state(), JobState::Failed);
        assert!(fx.workspace_is_clean());
    }

    #[tokio::test]
    async fn test_apk_without_lib_has_no_lib_dir() {
        let fx = Fixture::new();
        let apk = fx.path("app.apk");
        let aab = fx.path("app.aab");
        write_sample_apk(&apk);

        let result = fx.converter().convert(&ConversionJob::new(&apk, &aab), null()).await;

        assert!(result.is_success());
        assert!(archive_entries(&aab)
            .iter()
            .all(|e| !e.starts_with("base/root/lib")));
    }

    #[tokio::test]
    async fn test_native_libs_and_dex_are_stored() {
        let fx = Fixture::new();
        let apk = fx.path("native.apk");
        let aab = fx.path("native.aab");
        write_zip(
            &apk,
            &[
                ("AndroidManifest.xml", "<manifest/>"),
                ("classes.dex", "dex\n035 dex dex dex dex"),
                ("lib/arm64-v8a/libgame.so", "\x7fELF elf elf elf elf"),
                ("assets/level1.txt", "level level level level"),
            ],
        );

        let result = fx.converter().convert(&ConversionJob::new(&apk, &aab), null()).await;

        assert!(result.is_success(), "{}", result.message());
        assert_eq!(
            entry_compression(&aab, "base/root/lib/arm64-v8a/libgame.so"),
            CompressionMethod::Stored
        );
        assert_eq!(
            entry_compression(&aab, "base/dex/classes.dex"),
            CompressionMethod::Stored
        );
        assert_eq!(
            entry_compression(&aab, "base/root/assets/level1.txt"),
            CompressionMethod::Deflated
        );
    }

    #[tokio::test]
    async fn test_uncompressed_glob_can_be_ignored() {
        let mut fx = Fixture::new();
        fx.settings.package.honor_uncompressed_glob = false;
        let apk = fx.path("native.apk");
        let aab = fx.path("native.aab");
        write_zip(
            &apk,
            &[
                ("classes.dex", "dex\n035 dex dex dex dex"),
                ("lib/x86_64/libgame.so", "\x7fELF elf elf elf elf"),
            ],
        );

        let result = fx.converter().convert(&ConversionJob::new(&apk, &aab), null()).await;

        assert!(result.is_success());
        assert_eq!(
            entry_compression(&aab, "base/root/lib/x86_64/libgame.so"),
            CompressionMethod::Deflated
        );
        assert_eq!(
            entry_compression(&aab, "base/dex/classes.dex"),
            CompressionMethod::Deflated
        );
    }

    #[tokio::test]
    async fn test_corrupt_apk_fails_and_cleans_up() {
        let fx = Fixture::new();
        let apk = fx.path("broken.apk");
        let aab = fx.path("broken.aab");
        std::fs::write(&apk, b"definitely not a zip").unwrap();

        let result = fx.converter().convert(&ConversionJob::new(&apk, &aab), null()).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::ExtractionFailed));
        assert!(!aab.exists());
        assert!(fx.workspace_is_clean());
    }

    #[tokio::test]
    async fn test_second_job_is_rejected_while_busy() {
        let fx = Fixture::new();
        let apk = fx.path("app.apk");
        write_sample_apk(&apk);
        let converter = fx.converter();

        let _running = converter.active.try_lock().unwrap();
        let result = converter
            .convert(&ConversionJob::new(&apk, fx.path("app.aab")), null())
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Busy));
        assert!(!fx.path("app.aab").exists());
        assert_eq!(converter.state(), JobState::Idle);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_entry_set() {
        let fx = Fixture::new();
        let apk = fx.path("app.apk");
        let aab = fx.path("app.aab");
        write_sample_apk(&apk);
        let result = fx.converter().convert(&ConversionJob::new(&apk, &aab), null()).await;
        assert!(result.is_success());

        let unpacked = fx.path("unpacked");
        crate::bundle::extract::extract_builtin(&aab, &unpacked).unwrap();
        let rezipped = fx.path("rezipped.aab");
        archive::create_archive(&unpacked, &rezipped, &[]).unwrap();

        let mut original = archive_entries(&aab);
        let mut again = archive_entries(&rezipped);
        original.sort();
        again.sort();
        assert_eq!(original, again);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_entries_do_not_leak_host_files() {
        use crate::testutil::{archive_contains, write_zip_with_symlinks};

        let fx = Fixture::new();
        let secret = fx.path("host_secret.txt");
        std::fs::write(&secret, "TOP-SECRET-HOST-DATA").unwrap();
        let target = secret.to_string_lossy().into_owned();
        let apk = fx.path("evil.apk");
        let aab = fx.path("evil.aab");
        write_zip_with_symlinks(
            &apk,
            &[("classes.dex", "dex\n035"), ("res/values/strings.xml", "<resources/>")],
            &[
                ("AndroidManifest.xml", target.as_str()),
                ("res/raw/leak.bin", target.as_str()),
                ("lib/arm64-v8a/libleak.so", target.as_str()),
            ],
        );

        let result = fx.converter().convert(&ConversionJob::new(&apk, &aab), null()).await;

        // Extraction may refuse the links outright; a produced bundle must
        // not carry the linked file either way
        if result.is_success() {
            let entries = archive_entries(&aab);
            assert!(!entries.iter().any(|e| e == "base/manifest/AndroidManifest.xml"));
            assert!(entries.iter().any(|e| e == "base/dex/classes.dex"));
            assert!(!archive_contains(&aab, "TOP-SECRET-HOST-DATA"));
        } else {
            assert!(!aab.exists());
        }
        assert!(fx.workspace_is_clean());
    }

    #[tokio::test]
    async fn test_sign_missing_bundle_is_not_found() {
        let fx = Fixture::new();
        let result = fx
            .converter()
            .sign(&fx.path("nope.aab"), &CertificateInfo::default_debug(), null())
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
    }

    #[cfg(unix)]
    mod signing {
        use super::*;
        use crate::testutil::{fake_jarsigner, fake_keytool, read_lines};
        use serial_test::serial;

        struct Tools {
            calls: PathBuf,
            keytool_runs: PathBuf,
        }

        fn install_tools(fx: &mut Fixture, sign_exit: i32, verify_exit: i32) -> Tools {
            let bin = fx.path("bin");
            std::fs::create_dir_all(&bin).unwrap();
            let calls = fx.path("jarsigner.calls");
            let keytool_runs = fx.path("keytool.calls");
            fx.settings.tools.jarsigner =
                Some(fake_jarsigner(&bin, &calls, sign_exit, verify_exit));
            fx.settings.tools.keytool = Some(fake_keytool(&bin, &keytool_runs, "0"));
            Tools {
                calls,
                keytool_runs,
            }
        }

        #[tokio::test]
        #[serial]
        async fn test_default_identity_signs_and_provisions_once() {
            let mut fx = Fixture::new();
            let tools = install_tools(&mut fx, 0, 0);
            let apk = fx.path("app.apk");
            write_sample_apk(&apk);
            let converter = fx.converter();
            let job = ConversionJob::new(&apk, fx.path("app.aab"))
                .with_certificate(CertificateInfo::default_debug());

            let first = converter.run(&job, null()).await;
            assert!(first.is_success(), "{}", first.message());
            assert_eq!(converter.state(), JobState::Done);

            let second = converter.run(&job, null()).await;
            assert!(second.is_success(), "{}", second.message());

            assert_eq!(read_lines(&tools.keytool_runs).len(), 1);
            assert_eq!(
                read_lines(&tools.calls),
                vec!["sign", "verify", "sign", "verify"]
            );
            assert!(fx.path("home/.android/debug.keystore").is_file());
            assert!(fx.workspace_is_clean());
        }

        #[tokio::test]
        #[serial]
        async fn test_verification_failure_fails_job_but_keeps_output() {
            let mut fx = Fixture::new();
            install_tools(&mut fx, 0, 1);
            let apk = fx.path("app.apk");
            let aab = fx.path("app.aab");
            write_sample_apk(&apk);
            let converter = fx.converter();

            let result = converter
                .convert_and_sign(
                    &ConversionJob::new(&apk, &aab),
                    &CertificateInfo::default_debug(),
                    null(),
                )
                .await;

            assert!(!result.is_success());
            assert_eq!(result.error_kind(), Some(ErrorKind::VerificationFailed));
            assert!(aab.is_file());
            assert_eq!(converter.state(), JobState::Failed);
        }

        #[tokio::test]
        #[serial]
        async fn test_signing_failure_skips_verification() {
            let mut fx = Fixture::new();
            let tools = install_tools(&mut fx, 1, 0);
            let apk = fx.path("app.apk");
            let aab = fx.path("app.aab");
            write_sample_apk(&apk);

            let result = fx
                .converter()
                .convert_and_sign(
                    &ConversionJob::new(&apk, &aab),
                    &CertificateInfo::default_debug(),
                    null(),
                )
                .await;

            assert_eq!(result.error_kind(), Some(ErrorKind::SigningFailed));
            assert!(result.error().and_then(|e| e.stderr()).is_some());
            assert_eq!(read_lines(&tools.calls), vec!["sign"]);
            assert!(aab.is_file());
        }

        #[tokio::test]
        #[serial]
        async fn test_missing_custom_keystore() {
            let mut fx = Fixture::new();
            let tools = install_tools(&mut fx, 0, 0);
            let apk = fx.path("app.apk");
            let aab = fx.path("app.aab");
            write_sample_apk(&apk);
            let cert = CertificateInfo::custom(
                "release",
                fx.path("release.jks"),
                "store",
                "upload",
                "key",
            );

            let result = fx
                .converter()
                .convert_and_sign(&ConversionJob::new(&apk, &aab), &cert, null())
                .await;

            assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
            assert!(read_lines(&tools.calls).is_empty());
            assert!(aab.is_file());
        }

        #[tokio::test]
        #[serial]
        async fn test_conversion_failure_skips_signing() {
            let mut fx = Fixture::new();
            let tools = install_tools(&mut fx, 0, 0);

            let result = fx
                .converter()
                .convert_and_sign(
                    &ConversionJob::new(fx.path("missing.apk"), fx.path("app.aab")),
                    &CertificateInfo::default_debug(),
                    null(),
                )
                .await;

            assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
            assert!(read_lines(&tools.calls).is_empty());
            assert!(read_lines(&tools.keytool_runs).is_empty());
        }

        #[tokio::test]
        #[serial]
        async fn test_sign_existing_bundle() {
            let mut fx = Fixture::new();
            let tools = install_tools(&mut fx, 0, 0);
            let aab = fx.path("prebuilt.aab");
            std::fs::write(&aab, b"zip").unwrap();

            let result = fx
                .converter()
                .sign(&aab, &CertificateInfo::default_debug(), null())
                .await;

            assert!(result.is_success(), "{}", result.message());
            assert_eq!(result.output_path(), Some(aab.as_path()));
            assert_eq!(read_lines(&tools.calls), vec!["sign", "verify"]);
        }
    }
}
