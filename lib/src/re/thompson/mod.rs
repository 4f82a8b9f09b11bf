/*! A regexp compiler based on the [Thompson's construction][1] algorithm that
produces code for the Pike VM described in Russ Cox's article
[Regular Expression Matching: the Virtual Machine Approach][2].

The code is the same for every engine, a [`Program`] is a list of
instructions that operate on bytes. Characters outside the ASCII range are
compiled into the byte sequences of their UTF-8 encoding, so the engines
never decode the input. Repetitions are expanded by copying their
sub-expression, for instance `abc{2,4}` is compiled as if it was
`abcc(?:c(?:c)?)?`. Compiling large repetitions can exceed the size limit,
which is reported as an error instead of producing a huge program.

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
[2]: https://swtch.com/~rsc/regexp/regexp2.html
*/

pub(crate) use compiler::Compiler;
pub use instr::{
    Instr, InstrId, Metrics, Program, ProgramFlagSet, ProgramFlags,
};

mod compiler;
pub mod instr;
pub(crate) mod pikevm;
