//! MSVC toolchain implementation.
//!
//! Reference: <https://learn.microsoft.com/en-us/cpp/build/reference/compiler-options>
//!
//! Flag order matters to `cl` and `link` (the last of two conflicting flags
//! wins), so each command is assembled from fragments in a fixed order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::builder::BuildSession;
use crate::core::settings::ProjectSettings;
use crate::core::target::OutputKind;
use crate::util::fs::{find_in_dirs, normalize_path};

use super::{CommandSpec, ResolvedEnvironment, Toolchain, ToolchainError};

/// Extension of static and import libraries.
const LIB_EXTENSION: &str = "lib";

/// MSVC toolchain adapter (Windows).
///
/// Holds only the shared build session; every call takes the project's
/// settings and resolves the environment for them.
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    session: Arc<BuildSession>,
}

impl MsvcToolchain {
    /// Create an adapter bound to a build session.
    pub fn new(session: Arc<BuildSession>) -> Self {
        MsvcToolchain { session }
    }

    /// The build session this adapter resolves against.
    pub fn session(&self) -> &BuildSession {
        &self.session
    }

    /// Resolve the environment for one project and bind it to its settings.
    pub fn setup<'a>(
        &self,
        settings: &'a ProjectSettings,
    ) -> Result<MsvcInvocation<'a>, ToolchainError> {
        let env = self
            .session
            .resolve(settings.force_32_bit, settings.force_64_bit)?;
        Ok(MsvcInvocation::new(env, settings))
    }
}

impl Toolchain for MsvcToolchain {
    fn name(&self) -> &'static str {
        "msvc"
    }

    fn compile_command(&self, settings: &ProjectSettings) -> Result<CommandSpec, ToolchainError> {
        Ok(self.setup(settings)?.compile_command())
    }

    fn extended_compile_command(
        &self,
        base: &CommandSpec,
        output: &Path,
        input: &Path,
    ) -> CommandSpec {
        base.clone()
            .arg(format!("/Fo{}", output.display()))
            .arg(input.display().to_string())
    }

    fn link_command(
        &self,
        settings: &ProjectSettings,
        output: &Path,
        objects: &[PathBuf],
    ) -> Result<CommandSpec, ToolchainError> {
        Ok(self.setup(settings)?.link_command(output, objects))
    }

    fn find_library(&self, name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
        find_library(name, dirs)
    }

    fn object_extension(&self) -> &'static str {
        "obj"
    }
}

/// Look for `<name>.lib` in `dirs`, in order.
///
/// Import libraries for DLLs share the extension, so there is no separate
/// search for them.
pub fn find_library(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let found = find_in_dirs(&with_lib_extension(name), dirs);
    if found.is_none() {
        tracing::debug!("Library `{}` not found in {} directories", name, dirs.len());
    }
    found
}

/// Append `.lib` unless the name already carries it.
fn with_lib_extension(name: &str) -> String {
    let has_extension = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LIB_EXTENSION));
    if has_extension {
        name.to_string()
    } else {
        format!("{}.{}", name, LIB_EXTENSION)
    }
}

/// One project's settings bound to its resolved environment.
///
/// Every flag category has its own fragment method so the pieces can be
/// checked in isolation; `compile_command` and `link_command` only fix the
/// order.
#[derive(Debug, Clone)]
pub struct MsvcInvocation<'a> {
    env: ResolvedEnvironment,
    settings: &'a ProjectSettings,
}

impl<'a> MsvcInvocation<'a> {
    pub fn new(env: ResolvedEnvironment, settings: &'a ProjectSettings) -> Self {
        MsvcInvocation { env, settings }
    }

    /// The resolved environment this invocation builds against.
    pub fn env(&self) -> &ResolvedEnvironment {
        &self.env
    }

    // ---- compiler ----

    pub fn default_compiler_args(&self) -> Vec<String> {
        vec!["/nologo".into(), "/c".into(), "/arch:AVX".into()]
    }

    /// Defines, then undefines, each in insertion order.
    pub fn preprocessor_args(&self) -> Vec<String> {
        let defines = self.settings.defines.iter().map(|d| format!("/D{}", d));
        let undefines = self.settings.undefines.iter().map(|u| format!("/U{}", u));
        defines.chain(undefines).collect()
    }

    pub fn runtime_linkage_arg(&self) -> &'static str {
        let runtime = self.settings.runtime();
        if self.settings.debug_runtime {
            runtime.as_debug_flag()
        } else {
            runtime.as_flag()
        }
    }

    pub fn warning_args(&self) -> Option<&'static str> {
        self.settings.diagnostics().compiler_flag()
    }

    /// User include directories first so they are searched before the
    /// toolchain and SDK defaults.
    pub fn include_dir_args(&self) -> Vec<String> {
        let user = self
            .settings
            .include_dirs
            .iter()
            .map(|dir| format!("/I{}", normalize_path(dir).display()));
        let defaults = self
            .env
            .include_dirs
            .iter()
            .map(|dir| format!("/I{}", dir.display()));
        user.chain(defaults).collect()
    }

    /// All compiler arguments, in order.
    pub fn compiler_args(&self) -> Vec<String> {
        let mut args = self.default_compiler_args();
        args.extend(self.preprocessor_args());
        args.push(self.runtime_linkage_arg().to_string());
        args.extend(self.warning_args().map(String::from));
        args.extend(self.include_dir_args());
        args.extend(self.settings.extra_compiler_flags.iter().cloned());
        args
    }

    /// The base compile command shared by every source file.
    pub fn compile_command(&self) -> CommandSpec {
        CommandSpec::new(self.env.compiler()).args(self.compiler_args())
    }

    // ---- linker ----

    pub fn default_linker_args(&self) -> Vec<String> {
        std::iter::once("/NOLOGO".to_string())
            .chain(
                self.env
                    .lib_dirs
                    .iter()
                    .map(|dir| format!("/LIBPATH:{}", dir.display())),
            )
            .collect()
    }

    pub fn runtime_library_arg(&self) -> String {
        format!(
            "/DEFAULTLIB:{}",
            self.settings.runtime().default_lib(self.settings.debug_runtime)
        )
    }

    /// Flags that only make sense to `link`; empty when archiving.
    pub fn dynamic_linker_args(&self) -> Vec<String> {
        if self.settings.output.is_archive() {
            return Vec::new();
        }

        let mut args = vec![self.runtime_library_arg()];
        if self.settings.profile {
            args.push("/PROFILE".into());
        }
        if self.settings.wants_debug_info() {
            args.push("/DEBUG".into());
        }
        if self.settings.output == OutputKind::SharedLibrary {
            args.push("/DLL".into());
        }
        args
    }

    pub fn subsystem_arg(&self) -> Option<String> {
        self.settings
            .subsystem
            .as_token()
            .map(|token| format!("/SUBSYSTEM:{}", token))
    }

    pub fn architecture_arg(&self) -> String {
        format!("/MACHINE:{}", self.env.build_arch.machine_token())
    }

    /// The linker has no neutral setting here: one of the two is always emitted.
    pub fn linker_warning_arg(&self) -> &'static str {
        if self.settings.warnings_as_errors {
            "/WX"
        } else {
            "/WX:NO"
        }
    }

    pub fn library_dir_args(&self) -> Vec<String> {
        self.settings
            .library_dirs
            .iter()
            .map(|dir| format!("/LIBPATH:{}", normalize_path(dir).display()))
            .collect()
    }

    pub fn output_arg(&self, output: &Path) -> String {
        format!("/OUT:{}", output.display())
    }

    /// Plain, then static, then shared libraries.
    pub fn library_args(&self) -> Vec<String> {
        self.settings
            .libraries
            .iter()
            .chain(&self.settings.static_libraries)
            .chain(&self.settings.shared_libraries)
            .map(|name| with_lib_extension(name))
            .collect()
    }

    pub fn object_args(&self, objects: &[PathBuf]) -> Vec<String> {
        objects.iter().map(|obj| obj.display().to_string()).collect()
    }

    /// The program that produces this project's output.
    pub fn link_program(&self) -> PathBuf {
        if self.settings.output.is_archive() {
            self.env.archiver()
        } else {
            self.env.linker()
        }
    }

    /// All linker arguments, in order.
    pub fn linker_args(&self, output: &Path, objects: &[PathBuf]) -> Vec<String> {
        let mut args = self.default_linker_args();
        args.extend(self.dynamic_linker_args());
        args.extend(self.subsystem_arg());
        args.push(self.architecture_arg());
        args.push(self.linker_warning_arg().to_string());
        args.extend(self.library_dir_args());
        args.push(self.output_arg(output));
        args.extend(self.library_args());
        args.extend(self.object_args(objects));
        args.extend(self.settings.extra_linker_flags.iter().cloned());
        args
    }

    /// The link (or archive) command.
    pub fn link_command(&self, output: &Path, objects: &[PathBuf]) -> CommandSpec {
        CommandSpec::new(self.link_program()).args(self.linker_args(output, objects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::env::ToolchainLayout;
    use crate::builder::toolchain::Arch;
    use crate::core::settings::Subsystem;
    use crate::test_support::{fake_session, FAKE_HINT};

    fn env_for(build: Arch) -> ResolvedEnvironment {
        let layout = ToolchainLayout::new(Path::new(FAKE_HINT), Arch::X64, build);
        ResolvedEnvironment::new(layout, Arch::X64, build, PathBuf::from("/sdk"))
    }

    fn toolchain() -> MsvcToolchain {
        MsvcToolchain::new(Arc::new(fake_session()))
    }

    fn position(args: &[String], needle: &str) -> usize {
        args.iter()
            .position(|a| a == needle)
            .unwrap_or_else(|| panic!("`{}` missing from {:?}", needle, args))
    }

    #[test]
    fn test_shared_library_scenario() {
        let settings = ProjectSettings {
            output: OutputKind::SharedLibrary,
            static_runtime: false,
            debug_runtime: true,
            debug_level: 1,
            defines: vec!["FOO".into()],
            include_dirs: vec![PathBuf::from("inc")],
            ..Default::default()
        };
        let tc = toolchain();

        let compile = tc.compile_command(&settings).unwrap();
        assert_eq!(compile.program, PathBuf::from("/vs/VC/bin/amd64/cl"));
        assert!(compile.args.contains(&"/DFOO".to_string()));
        assert!(compile.args.contains(&"/MDd".to_string()));

        let link = tc
            .link_command(&settings, Path::new("out/foo.dll"), &[PathBuf::from("a.obj")])
            .unwrap();
        assert_eq!(link.program, PathBuf::from("/vs/VC/bin/amd64/link"));
        assert!(link.args.contains(&"/DLL".to_string()));
        assert!(link.args.contains(&"/DEBUG".to_string()));
        assert!(link.args.contains(&"/DEFAULTLIB:msvcrtd.lib".to_string()));
        assert!(link.args.contains(&"/MACHINE:X64".to_string()));
    }

    #[test]
    fn test_compile_order() {
        let settings = ProjectSettings {
            defines: vec!["B".into(), "A=1".into()],
            undefines: vec!["C".into()],
            static_runtime: true,
            warnings_as_errors: true,
            include_dirs: vec![PathBuf::from("inc/../include")],
            extra_compiler_flags: vec!["/O2".into()],
            ..Default::default()
        };
        let inv = MsvcInvocation::new(env_for(Arch::X64), &settings);
        let args = inv.compiler_args();

        assert_eq!(&args[..3], ["/nologo", "/c", "/arch:AVX"]);
        assert_eq!(&args[3..6], ["/DB", "/DA=1", "/UC"]);
        assert_eq!(args[6], "/MT");
        assert_eq!(args[7], "/WX");
        assert_eq!(args[8], "/Iinclude");
        assert_eq!(args[9], "/I/vs/VC/include");
        assert_eq!(args[10], "/I/sdk/include");
        assert_eq!(args.last().unwrap(), "/O2");
    }

    #[test]
    fn test_compile_command_is_deterministic() {
        let settings = ProjectSettings {
            defines: vec!["X".into()],
            include_dirs: vec![PathBuf::from("a"), PathBuf::from("b")],
            ..Default::default()
        };
        let tc = toolchain();
        assert_eq!(
            tc.compile_command(&settings).unwrap(),
            tc.compile_command(&settings).unwrap()
        );
    }

    #[test]
    fn test_user_includes_precede_defaults() {
        let settings = ProjectSettings {
            include_dirs: vec![PathBuf::from("z"), PathBuf::from("./y")],
            ..Default::default()
        };
        let inv = MsvcInvocation::new(env_for(Arch::X86), &settings);
        let args = inv.include_dir_args();
        assert_eq!(args, ["/Iz", "/Iy", "/I/vs/VC/include", "/I/sdk/include"]);
    }

    #[test]
    fn test_no_warnings_wins() {
        let settings = ProjectSettings {
            no_warnings: true,
            warnings_as_errors: true,
            ..Default::default()
        };
        let inv = MsvcInvocation::new(env_for(Arch::X64), &settings);
        let args = inv.compiler_args();
        assert!(args.contains(&"/w".to_string()));
        assert!(!args.contains(&"/WX".to_string()));

        // The linker still honours warnings-as-errors.
        assert_eq!(inv.linker_warning_arg(), "/WX");
    }

    #[test]
    fn test_runtime_linkage_permutations() {
        let cases = [
            (false, false, "/MD", "/DEFAULTLIB:msvcrt.lib"),
            (false, true, "/MDd", "/DEFAULTLIB:msvcrtd.lib"),
            (true, false, "/MT", "/DEFAULTLIB:libcmt.lib"),
            (true, true, "/MTd", "/DEFAULTLIB:libcmtd.lib"),
        ];
        for (static_runtime, debug_runtime, flag, default_lib) in cases {
            let settings = ProjectSettings {
                static_runtime,
                debug_runtime,
                ..Default::default()
            };
            let inv = MsvcInvocation::new(env_for(Arch::X64), &settings);
            assert_eq!(inv.runtime_linkage_arg(), flag);
            assert_eq!(inv.runtime_library_arg(), default_lib);
        }
    }

    #[test]
    fn test_extended_compile_command() {
        let tc = toolchain();
        let base = tc.compile_command(&ProjectSettings::default()).unwrap();

        let a = tc.extended_compile_command(&base, Path::new("obj/a.obj"), Path::new("src/a.c"));
        let b = tc.extended_compile_command(&base, Path::new("obj/b.obj"), Path::new("src/b.c"));

        assert_eq!(&a.args[..base.args.len()], &base.args[..]);
        assert_eq!(&a.args[base.args.len()..], ["/Foobj/a.obj", "src/a.c"]);
        assert_eq!(b.args.last().unwrap(), "src/b.c");
    }

    #[test]
    fn test_link_order() {
        let settings = ProjectSettings {
            subsystem: Subsystem::Console,
            library_dirs: vec![PathBuf::from("deps/./lib")],
            libraries: vec!["user32".into()],
            static_libraries: vec!["zlib.lib".into()],
            shared_libraries: vec!["ssl".into()],
            extra_linker_flags: vec!["/LTCG".into()],
            ..Default::default()
        };
        let inv = MsvcInvocation::new(env_for(Arch::X64), &settings);
        let objects = [PathBuf::from("a.obj"), PathBuf::from("b.obj")];
        let args = inv.linker_args(Path::new("app.exe"), &objects);

        assert_eq!(
            args,
            [
                "/NOLOGO",
                "/LIBPATH:/vs/VC/lib/amd64",
                "/LIBPATH:/sdk/lib/x64",
                "/DEFAULTLIB:msvcrt.lib",
                "/SUBSYSTEM:CONSOLE",
                "/MACHINE:X64",
                "/WX:NO",
                "/LIBPATH:deps/lib",
                "/OUT:app.exe",
                "user32.lib",
                "zlib.lib",
                "ssl.lib",
                "a.obj",
                "b.obj",
                "/LTCG",
            ]
        );
        assert!(position(&args, "/OUT:app.exe") < position(&args, "a.obj"));
    }

    #[test]
    fn test_static_library_skips_dynamic_flags() {
        let settings = ProjectSettings {
            output: OutputKind::StaticLibrary,
            profile: true,
            debug_level: 3,
            debug_runtime: true,
            ..Default::default()
        };
        let inv = MsvcInvocation::new(env_for(Arch::X86), &settings);
        let cmd = inv.link_command(Path::new("foo.lib"), &[PathBuf::from("a.obj")]);

        assert_eq!(cmd.program, PathBuf::from("/vs/VC/bin/lib"));
        for flag in ["/DLL", "/PROFILE", "/DEBUG"] {
            assert!(!cmd.args.contains(&flag.to_string()), "{}", flag);
        }
        assert!(!cmd.args.iter().any(|a| a.starts_with("/DEFAULTLIB")));
        assert!(cmd.args.contains(&"/MACHINE:X86".to_string()));
    }

    #[test]
    fn test_profile_implies_debug() {
        let settings = ProjectSettings {
            profile: true,
            ..Default::default()
        };
        let inv = MsvcInvocation::new(env_for(Arch::X64), &settings);
        let args = inv.dynamic_linker_args();
        assert_eq!(args, ["/DEFAULTLIB:msvcrt.lib", "/PROFILE", "/DEBUG"]);
    }

    #[test]
    fn test_subsystem_flag() {
        for subsystem in Subsystem::ALL {
            let settings = ProjectSettings {
                subsystem,
                ..Default::default()
            };
            let inv = MsvcInvocation::new(env_for(Arch::X64), &settings);
            let args = inv.linker_args(Path::new("a.exe"), &[]);
            let count = args.iter().filter(|a| a.starts_with("/SUBSYSTEM")).count();
            let expected = usize::from(subsystem != Subsystem::Default);
            assert_eq!(count, expected, "{:?}", subsystem);
        }

        let settings = ProjectSettings {
            subsystem: Subsystem::EfiBootServiceDriver,
            ..Default::default()
        };
        let inv = MsvcInvocation::new(env_for(Arch::X64), &settings);
        assert_eq!(
            inv.subsystem_arg().as_deref(),
            Some("/SUBSYSTEM:EFI_BOOT_SERVICE_DRIVER")
        );
    }

    #[test]
    fn test_forced_32_bit_on_64_bit_host() {
        let settings = ProjectSettings {
            force_32_bit: true,
            ..Default::default()
        };
        let tc = toolchain();
        let link = tc.link_command(&settings, Path::new("a.exe"), &[]).unwrap();
        assert_eq!(link.program, PathBuf::from("/vs/VC/bin/link"));
        assert!(link.args.contains(&"/MACHINE:X86".to_string()));
        assert!(link.args.contains(&"/LIBPATH:/sdk/x86/lib".to_string()));
    }

    #[test]
    fn test_conflicting_force_is_rejected() {
        let settings = ProjectSettings {
            force_32_bit: true,
            force_64_bit: true,
            ..Default::default()
        };
        assert!(matches!(
            toolchain().compile_command(&settings),
            Err(ToolchainError::ConflictingArchitecture)
        ));
    }

    #[test]
    fn test_find_library_prefers_first_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(first.join("zlib.lib"), "").unwrap();
        std::fs::write(second.join("zlib.lib"), "").unwrap();
        std::fs::write(second.join("png.lib"), "").unwrap();

        let dirs = vec![first.clone(), second.clone()];
        let tc = toolchain();
        assert_eq!(tc.find_library("zlib", &dirs), Some(first.join("zlib.lib")));
        assert_eq!(tc.find_library("png.lib", &dirs), Some(second.join("png.lib")));
        assert_eq!(tc.find_library("ssl", &dirs), None);
    }

    #[test]
    fn test_interrupt_exit_code() {
        let tc = toolchain();
        assert_eq!(tc.interrupt_exit_code(), -1);
        assert_eq!(tc.output_extension(OutputKind::SharedLibrary), "dll");
        assert_eq!(tc.object_extension(), "obj");
    }
}
