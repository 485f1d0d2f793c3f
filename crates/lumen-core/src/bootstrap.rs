// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ordered init/teardown of the subsystems that populate a [`TypedContext`].
//!
//! The context never decides ordering on its own. A [`Bootstrap`] runs each
//! subsystem's `init` in the order it was pushed and its `deinit` in exact
//! reverse, so services are removed before the services they depend on.

use thiserror::Error;

use crate::context::TypedContext;

/// A unit of the application that adds services on init and removes them on deinit.
pub trait Subsystem {
    /// A human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Registers this subsystem's services.
    fn init(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()>;

    /// Unregisters this subsystem's services.
    fn deinit(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()>;
}

/// An error raised while running a [`Bootstrap`] sequence.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A subsystem failed to initialise. Earlier subsystems were rolled back.
    #[error("subsystem `{name}` failed to initialise: {reason:#}")]
    Init {
        /// The failing subsystem.
        name: String,
        /// What went wrong.
        reason: anyhow::Error,
    },
    /// A subsystem failed to shut down. The remaining subsystems were still deinitialised.
    #[error("subsystem `{name}` failed to shut down: {reason:#}")]
    Deinit {
        /// The failing subsystem.
        name: String,
        /// What went wrong.
        reason: anyhow::Error,
    },
}

/// An ordered list of subsystems with symmetric init and teardown.
#[derive(Default)]
pub struct Bootstrap {
    subsystems: Vec<Box<dyn Subsystem>>,
    /// How many leading subsystems are currently initialised.
    initialised: usize,
}

impl Bootstrap {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subsystem; builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, subsystem: impl Subsystem + 'static) -> Self {
        self.push(Box::new(subsystem));
        self
    }

    /// Appends a subsystem to the end of the sequence.
    pub fn push(&mut self, subsystem: Box<dyn Subsystem>) {
        self.subsystems.push(subsystem);
    }

    /// Number of subsystems in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subsystems.len()
    }

    /// Returns `true` if the sequence has no subsystems.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subsystems.is_empty()
    }

    /// Returns `true` once every subsystem has been initialised.
    #[must_use]
    pub fn is_initialised(&self) -> bool {
        !self.subsystems.is_empty() && self.initialised == self.subsystems.len()
    }

    /// Initialises every subsystem that is not yet initialised, in order.
    ///
    /// If one fails, the subsystems initialised so far are de-initialised in
    /// reverse order and the failure is returned.
    pub fn init(&mut self, ctx: &mut TypedContext) -> Result<(), BootstrapError> {
        while self.initialised < self.subsystems.len() {
            let subsystem = &mut self.subsystems[self.initialised];
            log::info!("Bootstrap: initialising `{}`", subsystem.name());

            if let Err(reason) = subsystem.init(ctx) {
                let name = subsystem.name().to_owned();
                log::error!("Bootstrap: `{name}` failed to initialise: {reason:#}");
                if let Err(rollback) = self.deinit(ctx) {
                    log::error!("Bootstrap: rollback incomplete: {rollback}");
                }
                return Err(BootstrapError::Init { name, reason });
            }
            self.initialised += 1;
        }
        Ok(())
    }

    /// De-initialises the initialised subsystems in reverse order.
    ///
    /// Every subsystem gets its `deinit` call even if an earlier one fails;
    /// the first failure is returned.
    pub fn deinit(&mut self, ctx: &mut TypedContext) -> Result<(), BootstrapError> {
        let mut first_error = None;
        while self.initialised > 0 {
            self.initialised -= 1;
            let subsystem = &mut self.subsystems[self.initialised];
            log::info!("Bootstrap: shutting down `{}`", subsystem.name());

            if let Err(reason) = subsystem.deinit(ctx) {
                let name = subsystem.name().to_owned();
                log::error!("Bootstrap: `{name}` failed to shut down: {reason:#}");
                first_error.get_or_insert(BootstrapError::Deinit { name, reason });
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        journal: Journal,
        fail_init: bool,
    }

    struct Marker;

    impl Subsystem for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn init(&mut self, _ctx: &mut TypedContext) -> anyhow::Result<()> {
            if self.fail_init {
                anyhow::bail!("refusing to start");
            }
            self.journal.borrow_mut().push(format!("init {}", self.name));
            Ok(())
        }

        fn deinit(&mut self, _ctx: &mut TypedContext) -> anyhow::Result<()> {
            self.journal.borrow_mut().push(format!("deinit {}", self.name));
            Ok(())
        }
    }

    struct MarkerSubsystem;

    impl Subsystem for MarkerSubsystem {
        fn name(&self) -> &str {
            "marker"
        }

        fn init(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()> {
            ctx.add(Marker)?;
            Ok(())
        }

        fn deinit(&mut self, ctx: &mut TypedContext) -> anyhow::Result<()> {
            ctx.remove::<Marker>()?;
            Ok(())
        }
    }

    fn recorder(name: &'static str, journal: &Journal, fail_init: bool) -> Recorder {
        Recorder {
            name,
            journal: Rc::clone(journal),
            fail_init,
        }
    }

    #[test]
    fn test_deinit_runs_in_reverse_order() {
        let journal = Journal::default();
        let mut ctx = TypedContext::new();
        let mut bootstrap = Bootstrap::new()
            .with(recorder("logging", &journal, false))
            .with(recorder("assets", &journal, false))
            .with(recorder("editor", &journal, false));

        bootstrap.init(&mut ctx).unwrap();
        assert!(bootstrap.is_initialised());
        bootstrap.deinit(&mut ctx).unwrap();
        assert!(!bootstrap.is_initialised());

        assert_eq!(
            *journal.borrow(),
            vec![
                "init logging",
                "init assets",
                "init editor",
                "deinit editor",
                "deinit assets",
                "deinit logging",
            ]
        );
    }

    #[test]
    fn test_failed_init_rolls_back_only_initialised() {
        let journal = Journal::default();
        let mut ctx = TypedContext::new();
        let mut bootstrap = Bootstrap::new()
            .with(recorder("logging", &journal, false))
            .with(recorder("assets", &journal, true))
            .with(recorder("editor", &journal, false));

        let err = bootstrap.init(&mut ctx).unwrap_err();
        assert!(matches!(err, BootstrapError::Init { ref name, .. } if name == "assets"));
        assert_eq!(*journal.borrow(), vec!["init logging", "deinit logging"]);
    }

    #[test]
    fn test_subsystems_own_their_services() {
        let mut ctx = TypedContext::new();
        let mut bootstrap = Bootstrap::new().with(MarkerSubsystem);

        bootstrap.init(&mut ctx).unwrap();
        assert!(ctx.has::<Marker>());
        bootstrap.deinit(&mut ctx).unwrap();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_double_registration_surfaces_as_init_error() {
        let mut ctx = TypedContext::new();
        ctx.add(Marker).unwrap();
        let mut bootstrap = Bootstrap::new().with(MarkerSubsystem);

        let err = bootstrap.init(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }
}
