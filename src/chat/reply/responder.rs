//! Response generation.
//!
//! The store only ever sees the returned string. [`MockResponder`] stands in
//! for a real model: it fills canned markdown templates with the user's
//! input. A network-backed implementation would plug in behind the same
//! trait.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Why a reply is being generated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplyContext {
    /// First message, sent from the empty state.
    NewConversation,
    /// Message sent inside an existing conversation.
    FollowUp,
}

/// Produces assistant replies for user input.
pub trait Responder {
    /// Generate the reply text for `input`.
    fn reply(&mut self, input: &str, context: ReplyContext) -> String;
}

const INPUT_MARKER: &str = "{input}";

const STARTER_TEMPLATE: &str = "Here is a response to \"{input}\".

This is a demo template, so connect a backend API to get real AI responses.

### Next steps

1. Set up the backend API endpoint
2. Implement sending chat messages
3. Handle streaming responses (optional)

Anything else you'd like to know?";

const FOLLOW_UP_TEMPLATES: [&str; 3] = [
    "Got it, you asked about \"{input}\". This is a demo response.

A few examples:

1. **Bold text** example
2. *Italic text* example
3. `Inline code` example

A code block:

```javascript
function hello() {
  console.log(\"Hello, World!\");
}
```

Anything else you'd like to know?",
    "Thanks for asking! Here is some information about \"{input}\":

### Key points

- First point
- Second point
- Third point

> This is an example quote.

Feel free to ask anything else!",
    "Good question! Here is an answer to \"{input}\".

#### Example code

```python
def example():
    print(\"This is a demo response\")
    return True
```

#### Explanation

1. Define the function
2. Print a message
3. Return True

Was this helpful?",
];

fn fill(template: &str, input: &str) -> String {
    template.replace(INPUT_MARKER, input)
}

/// Canned-response generator.
pub struct MockResponder {
    rng: StdRng,
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResponder {
    /// Responder seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Responder with reproducible template choices.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of follow-up templates in the pool.
    #[must_use]
    pub const fn pool_size() -> usize {
        FOLLOW_UP_TEMPLATES.len()
    }
}

impl Responder for MockResponder {
    fn reply(&mut self, input: &str, context: ReplyContext) -> String {
        match context {
            ReplyContext::NewConversation => fill(STARTER_TEMPLATE, input),
            ReplyContext::FollowUp => {
                let index = self.rng.gen_range(0..FOLLOW_UP_TEMPLATES.len());
                fill(FOLLOW_UP_TEMPLATES[index], input)
            }
        }
    }
}
