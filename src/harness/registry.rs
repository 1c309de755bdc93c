//! Test registry
//!
//! Holds registered tests in order, assigns indexes and resolves titles.

use crate::error::HarnessError;
use crate::executor::TestBody;
use crate::models::{Modifiers, RunStats, TestKind, TestReport};

/// Optional explicit title accepted by the registration methods
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Title(Option<String>);

impl Title {
    pub fn none() -> Self {
        Self(None)
    }

    fn into_inner(self) -> Option<String> {
        self.0.filter(|t| !t.trim().is_empty())
    }
}

impl From<&str> for Title {
    fn from(title: &str) -> Self {
        Self(Some(title.to_string()))
    }
}

impl From<String> for Title {
    fn from(title: String) -> Self {
        Self(Some(title))
    }
}

impl From<&String> for Title {
    fn from(title: &String) -> Self {
        Self(Some(title.clone()))
    }
}

impl From<Option<&str>> for Title {
    fn from(title: Option<&str>) -> Self {
        Self(title.map(str::to_string))
    }
}

/// Declared symbol name of a body type.
///
/// Function items report their path (`my_crate::tests::sasa`), closures
/// report `{{closure}}` and have no usable name.
pub fn declared_name<F>() -> Option<String> {
    let full = std::any::type_name::<F>();
    if full.contains("{{closure}}") {
        return None;
    }

    let name = full.rsplit("::").next()?;
    let is_ident = !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    is_ident.then(|| name.to_string())
}

/// Builder for a single registration
pub struct TestSpec<A> {
    title: Title,
    declared_name: Option<String>,
    body: Option<TestBody<A>>,
    modifiers: Modifiers,
}

impl<A: 'static> TestSpec<A> {
    pub fn new() -> Self {
        Self {
            title: Title::none(),
            declared_name: None,
            body: None,
            modifiers: Modifiers::none(),
        }
    }

    pub fn title(mut self, title: impl Into<Title>) -> Self {
        self.title = title.into();
        self
    }

    pub fn sync<F, R>(mut self, f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        R: crate::executor::IntoOutcome,
    {
        self.declared_name = declared_name::<F>();
        self.body = Some(TestBody::sync(f));
        self
    }

    pub fn future<F, Fut, R>(mut self, f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = R> + Send + 'static,
        R: crate::executor::IntoOutcome + 'static,
    {
        self.declared_name = declared_name::<F>();
        self.body = Some(TestBody::future(f));
        self
    }

    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: Fn(A, crate::executor::Done) + Send + Sync + 'static,
    {
        self.declared_name = declared_name::<F>();
        self.body = Some(TestBody::callback(f));
        self
    }

    /// Use a prebuilt body; no name can be inferred from it
    pub fn body(mut self, body: TestBody<A>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn skip(mut self) -> Self {
        self.modifiers.skip = true;
        self
    }

    pub fn todo(mut self) -> Self {
        self.modifiers.todo = true;
        self
    }
}

impl<A: 'static> Default for TestSpec<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered test
pub struct TestDescriptor<A> {
    title: String,
    index: usize,
    modifiers: Modifiers,
    body: TestBody<A>,
}

impl<A> TestDescriptor<A> {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 1-based registration position
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> TestKind {
        self.body.kind()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn body(&self) -> &TestBody<A> {
        &self.body
    }

    /// Fresh pending report for this test
    pub fn report(&self) -> TestReport {
        TestReport::pending(self.title.clone(), self.index, self.kind(), self.modifiers)
    }
}

/// Ordered collection of registered tests
pub struct Registry<A> {
    tests: Vec<TestDescriptor<A>>,
}

impl<A> Registry<A> {
    pub fn new() -> Self {
        Self { tests: Vec::new() }
    }

    pub fn tests(&self) -> &[TestDescriptor<A>] {
        &self.tests
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TestDescriptor<A>> {
        index.checked_sub(1).and_then(|i| self.tests.get(i))
    }

    /// Validate and append a registration, updating the counters in `stats`.
    ///
    /// Nothing is appended or counted when no body was given.
    pub fn register(
        &mut self,
        spec: TestSpec<A>,
        stats: &mut RunStats,
    ) -> Result<&TestDescriptor<A>, HarnessError> {
        let TestSpec {
            title,
            declared_name,
            body,
            modifiers,
        } = spec;

        let body = body.ok_or_else(|| {
            HarnessError::InvalidArgument(format!(
                "test {} was registered without a body",
                self.tests.len() + 1
            ))
        })?;

        let title = match title.into_inner().or(declared_name) {
            Some(title) => title,
            None => {
                stats.anonymous += 1;
                format!("(unnamed test {})", stats.anonymous)
            }
        };

        stats.count += 1;
        if modifiers.skip {
            stats.skip += 1;
        }
        if modifiers.todo {
            stats.todo += 1;
        }

        let index = self.tests.len() + 1;
        self.tests.push(TestDescriptor {
            title,
            index,
            modifiers,
            body,
        });
        Ok(&self.tests[index - 1])
    }
}

impl<A> Default for Registry<A> {
    fn default() -> Self {
        Self::new()
    }
}
