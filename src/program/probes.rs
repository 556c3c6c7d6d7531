//! The probe catalog: three routines covering IX/IY indirect loads/stores,
//! indexed arithmetic, and DD/FD CB prefixed rotates/shifts/bit tests.
//!
//! Each checkpoint is a data record rather than open-coded emission, so the
//! assembly pass in [`super`] can iterate the catalog uniformly: emit the
//! checkpoint's instruction bytes, emit the comparison (if any), then the
//! `JP NZ` to the checkpoint's failure handler.
//!
//! Scratch memory is fixed at IX = 0x8000 and IY = 0x8100, well above the
//! image itself.

/// What must hold after a checkpoint's instruction bytes have executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// The accumulator equals this literal: assembled as `CP n` followed by
    /// `JP NZ,handler`.
    Acc(u8),
    /// The last instruction left the zero flag set: assembled as a bare
    /// `JP NZ,handler` that must fall through.
    ZeroFlag,
}

/// One micro-test: instruction bytes, the expectation checked after them,
/// and the handler/message pair reporting a mismatch.
#[derive(Debug)]
pub struct Checkpoint {
    /// Label of the failure handler this checkpoint branches to.
    pub handler: &'static str,
    /// Instruction bytes executed before the check.
    pub code: &'static [u8],
    pub expect: Expect,
    /// Message reported when the expectation does not hold. Must not
    /// contain the `$` string terminator.
    pub message: &'static str,
}

/// A self-contained routine of checkpoints, entered by `CALL` and returning
/// to the entry block on full success.
#[derive(Debug)]
pub struct Probe {
    /// Label of the routine.
    pub routine: &'static str,
    /// Instruction bytes executed once before the first checkpoint.
    pub setup: &'static [u8],
    pub checkpoints: &'static [Checkpoint],
}

pub const PROBES: &[Probe] = &[
    Probe {
        routine: "test_indirect",
        setup: &[
            0xDD, 0x21, 0x00, 0x80, // LD IX,0x8000
            0xFD, 0x21, 0x00, 0x81, // LD IY,0x8100
            0xDD, 0x36, 0x00, 0x11, // LD (IX+0),0x11
            0xDD, 0x36, 0x01, 0x22, // LD (IX+1),0x22
            0xFD, 0x36, 0x00, 0x33, // LD (IY+0),0x33
            0xFD, 0x36, 0x01, 0x44, // LD (IY+1),0x44
        ],
        checkpoints: &[
            Checkpoint {
                handler: "fail_indirect_ix0",
                code: &[
                    0xDD, 0x7E, 0x00, // LD A,(IX+0)
                ],
                expect: Expect::Acc(0x11),
                message: "IXIY FAIL indirect: IX load 0",
            },
            Checkpoint {
                handler: "fail_indirect_ix1",
                code: &[
                    0xDD, 0x7E, 0x01, // LD A,(IX+1)
                ],
                expect: Expect::Acc(0x22),
                message: "IXIY FAIL indirect: IX load 1",
            },
            Checkpoint {
                handler: "fail_indirect_store_ix",
                code: &[
                    0x0E, 0x55, // LD C,0x55
                    0xDD, 0x71, 0x03, // LD (IX+3),C
                    0xDD, 0x7E, 0x03, // LD A,(IX+3)
                ],
                expect: Expect::Acc(0x55),
                message: "IXIY FAIL indirect: IX store",
            },
            Checkpoint {
                handler: "fail_indirect_store_iy",
                code: &[
                    0xFD, 0x77, 0x02, // LD (IY+2),A
                    0xFD, 0x7E, 0x02, // LD A,(IY+2)
                ],
                expect: Expect::Acc(0x55),
                message: "IXIY FAIL indirect: IY store",
            },
        ],
    },
    Probe {
        routine: "test_alu",
        setup: &[
            0xDD, 0x21, 0x00, 0x80, // LD IX,0x8000
            0xFD, 0x21, 0x00, 0x81, // LD IY,0x8100
        ],
        // The expected literals form a dependent chain: each step's result
        // feeds the next (0x05 -> 0x15 -> 0x16 -> 0x14 -> 0x1C -> 0x1F).
        checkpoints: &[
            Checkpoint {
                handler: "fail_alu_add",
                code: &[
                    0xDD, 0x36, 0x00, 0x10, // LD (IX+0),0x10
                    0x3E, 0x05, // LD A,0x05
                    0xDD, 0x86, 0x00, // ADD A,(IX+0)
                ],
                expect: Expect::Acc(0x15),
                message: "IXIY FAIL alu: add",
            },
            Checkpoint {
                handler: "fail_alu_adc",
                // Carry is clear after the previous CP matched, so ADC adds
                // exactly the operand plus zero.
                code: &[
                    0xDD, 0x36, 0x01, 0x01, // LD (IX+1),0x01
                    0xDD, 0x8E, 0x01, // ADC A,(IX+1)
                ],
                expect: Expect::Acc(0x16),
                message: "IXIY FAIL alu: adc",
            },
            Checkpoint {
                handler: "fail_alu_sub",
                code: &[
                    0xDD, 0x36, 0x02, 0x02, // LD (IX+2),0x02
                    0xDD, 0x96, 0x02, // SUB (IX+2)
                ],
                expect: Expect::Acc(0x14),
                message: "IXIY FAIL alu: sub",
            },
            Checkpoint {
                handler: "fail_alu_xor",
                code: &[
                    0xDD, 0x36, 0x03, 0x08, // LD (IX+3),0x08
                    0xDD, 0xAE, 0x03, // XOR (IX+3)
                ],
                expect: Expect::Acc(0x1C),
                message: "IXIY FAIL alu: xor",
            },
            Checkpoint {
                handler: "fail_alu_or",
                code: &[
                    0xFD, 0x36, 0x00, 0x0F, // LD (IY+0),0x0F
                    0xFD, 0xB6, 0x00, // OR (IY+0)
                ],
                expect: Expect::Acc(0x1F),
                message: "IXIY FAIL alu: or",
            },
            Checkpoint {
                handler: "fail_alu_cp",
                // CP against an equal operand sets Z itself; the check is
                // the fallthrough, not a second comparison.
                code: &[
                    0xFD, 0x36, 0x01, 0x1F, // LD (IY+1),0x1F
                    0xFD, 0xBE, 0x01, // CP (IY+1)
                ],
                expect: Expect::ZeroFlag,
                message: "IXIY FAIL alu: cp",
            },
        ],
    },
    Probe {
        routine: "test_ddcb",
        setup: &[
            0xDD, 0x21, 0x00, 0x80, // LD IX,0x8000
            0xFD, 0x21, 0x00, 0x81, // LD IY,0x8100
        ],
        // The DD/FD CB forms write the result both to (IX/IY+d) and to the
        // register encoded in the low opcode bits; each rotate/shift is
        // therefore checked twice, once through HL and once through the
        // copy register.
        checkpoints: &[
            Checkpoint {
                handler: "fail_ddcb_sla_mem",
                code: &[
                    0x21, 0x00, 0x80, // LD HL,0x8000
                    0xDD, 0x36, 0x00, 0x81, // LD (IX+0),0x81
                    0xDD, 0xCB, 0x00, 0x24, // SLA (IX+0),H
                    0x7E, // LD A,(HL)
                ],
                expect: Expect::Acc(0x02),
                message: "IXIY FAIL dd/fd: SLA mem",
            },
            Checkpoint {
                handler: "fail_ddcb_sla_ixh",
                code: &[
                    0xDD, 0x7C, // LD A,IXH
                ],
                expect: Expect::Acc(0x02),
                message: "IXIY FAIL dd/fd: SLA IXH",
            },
            Checkpoint {
                handler: "fail_ddcb_rl_mem",
                // SLA above destroyed IXH; reload IX before reusing it.
                // Carry is clear here because the preceding CP matched, so
                // RL shifts in a zero bit.
                code: &[
                    0xDD, 0x21, 0x00, 0x80, // LD IX,0x8000
                    0x21, 0x01, 0x80, // LD HL,0x8001
                    0xDD, 0x36, 0x01, 0x01, // LD (IX+1),0x01
                    0xDD, 0xCB, 0x01, 0x10, // RL (IX+1),B
                    0x7E, // LD A,(HL)
                ],
                expect: Expect::Acc(0x02),
                message: "IXIY FAIL dd/fd: RL mem",
            },
            Checkpoint {
                handler: "fail_ddcb_rl_reg",
                code: &[
                    0x78, // LD A,B
                ],
                expect: Expect::Acc(0x02),
                message: "IXIY FAIL dd/fd: RL reg",
            },
            Checkpoint {
                handler: "fail_ddcb_sra_mem",
                code: &[
                    0xFD, 0x21, 0x00, 0x81, // LD IY,0x8100
                    0x21, 0x00, 0x81, // LD HL,0x8100
                    0xFD, 0x36, 0x00, 0x40, // LD (IY+0),0x40
                    0xFD, 0xCB, 0x00, 0x2D, // SRA (IY+0),L
                    0x7E, // LD A,(HL)
                ],
                expect: Expect::Acc(0x20),
                message: "IXIY FAIL dd/fd: SRA mem",
            },
            Checkpoint {
                handler: "fail_ddcb_sra_iyl",
                code: &[
                    0xFD, 0x7D, // LD A,IYL
                ],
                expect: Expect::Acc(0x20),
                message: "IXIY FAIL dd/fd: SRA IYL",
            },
            Checkpoint {
                handler: "fail_ddcb_bit_zero",
                // (IY+0) holds 0x20 with bit 0 clear, so BIT 0 sets Z and
                // the NZ branch must not be taken.
                code: &[
                    0xFD, 0xCB, 0x00, 0x46, // BIT 0,(IY+0)
                ],
                expect: Expect::ZeroFlag,
                message: "IXIY FAIL dd/fd: BIT zero",
            },
        ],
    },
];
