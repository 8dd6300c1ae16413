//! Built-in wrapper definitions
//!
//! Mirrors the slot and param names used by the upstream snakemake-wrappers
//! so a rendered rule works against the published wrapper scripts.

use super::definition::{ParamDef, SlotDef, WrapperDef};

/// Get every built-in wrapper definition
pub fn builtins() -> Vec<WrapperDef> {
    let mut defs = Vec::new();
    defs.extend(bwa());
    defs.extend(samtools());
    defs.extend(bcftools());
    defs.extend(gatk());
    defs.extend(bedtools());
    defs.extend(salmon());
    defs.extend(qc());
    defs
}

fn extra() -> ParamDef {
    ParamDef::str("extra").default_value("").describe("Additional command-line arguments")
}

fn java_opts() -> ParamDef {
    ParamDef::str("java_opts").describe("Options passed to the JVM, e.g. -Xmx4g")
}

fn bwa() -> Vec<WrapperDef> {
    vec![
        WrapperDef::new("bwa/index", "Build a BWA index for a reference FASTA")
            .input(SlotDef::positional("fasta"))
            .output(SlotDef::named("idx").multiple().describe("Index files (.amb .ann .bwt .pac .sa)"))
            .param(ParamDef::str("algorithm").describe("Indexing algorithm: is or bwtsw")),
        WrapperDef::new("bwa/mem", "Map reads with bwa mem, optionally sorting the output")
            .input(SlotDef::named("reads").multiple().describe("One (single-end) or two (paired-end) FASTQ files"))
            .input(SlotDef::named("idx").multiple().describe("BWA index files"))
            .output(SlotDef::positional("bam"))
            .param(extra())
            .param(ParamDef::str("sorting").default_value("none").describe("none, samtools or picard"))
            .param(ParamDef::str("sort_order").default_value("coordinate"))
            .param(ParamDef::str("sort_extra").default_value(""))
            .threaded(),
    ]
}

fn samtools() -> Vec<WrapperDef> {
    vec![
        WrapperDef::new("samtools/sort", "Sort a SAM/BAM/CRAM file")
            .input(SlotDef::positional("bam"))
            .output(SlotDef::positional("bam"))
            .param(extra())
            .threaded(),
        WrapperDef::new("samtools/index", "Index a coordinate-sorted BAM/CRAM file")
            .input(SlotDef::positional("bam"))
            .output(SlotDef::positional("bai"))
            .param(extra())
            .threaded(),
        WrapperDef::new("samtools/view", "Convert or filter a SAM/BAM/CRAM file")
            .input(SlotDef::positional("bam"))
            .output(SlotDef::positional("out"))
            .param(extra())
            .param(ParamDef::str("region").describe("Region to extract, e.g. chr1:1-1000"))
            .threaded(),
        WrapperDef::new("samtools/faidx", "Index a FASTA file")
            .input(SlotDef::positional("fasta"))
            .output(SlotDef::positional("fai"))
            .param(extra()),
        WrapperDef::new("samtools/flagstat", "Alignment flag statistics")
            .input(SlotDef::positional("bam"))
            .output(SlotDef::positional("flagstat"))
            .param(extra())
            .threaded(),
        WrapperDef::new("samtools/merge", "Merge several BAM files")
            .input(SlotDef::positional("bams").multiple())
            .output(SlotDef::positional("bam"))
            .param(extra())
            .threaded(),
    ]
}

fn bcftools() -> Vec<WrapperDef> {
    vec![
        WrapperDef::new("bcftools/call", "Call variants from an mpileup")
            .input(SlotDef::named("pileup"))
            .output(SlotDef::named("calls"))
            .param(ParamDef::bool("uncompressed_bcf").default_value(false))
            .param(ParamDef::str("caller").default_value("-m").describe("-m (multiallelic) or -c (consensus)"))
            .param(extra())
            .threaded(),
        WrapperDef::new("bcftools/view", "Subset, filter and convert VCF/BCF files")
            .input(SlotDef::positional("vcf"))
            .output(SlotDef::positional("out"))
            .param(extra())
            .threaded(),
        WrapperDef::new("bcftools/index", "Index a compressed VCF/BCF file")
            .input(SlotDef::positional("vcf"))
            .output(SlotDef::positional("index"))
            .param(extra())
            .threaded(),
        WrapperDef::new("bcftools/concat", "Concatenate VCF/BCF files with the same samples")
            .input(SlotDef::named("calls").multiple())
            .output(SlotDef::positional("out"))
            .param(ParamDef::bool("uncompressed_bcf").default_value(false))
            .param(extra())
            .threaded(),
        WrapperDef::new("bcftools/norm", "Normalize indels and split multiallelic sites")
            .input(SlotDef::positional("vcf"))
            .output(SlotDef::positional("out"))
            .param(extra())
            .threaded(),
    ]
}

fn gatk() -> Vec<WrapperDef> {
    vec![
        WrapperDef::new("gatk/haplotypecaller", "Call germline SNVs and indels via local re-assembly")
            .input(SlotDef::named("bam"))
            .input(SlotDef::named("ref"))
            .input(SlotDef::named("known").optional())
            .input(SlotDef::named("intervals").optional())
            .output(SlotDef::named("vcf").optional())
            .output(SlotDef::named("gvcf").optional())
            .param(extra())
            .param(java_opts())
            .threaded(),
        WrapperDef::new("gatk/genotypegvcfs", "Joint genotyping of a GVCF")
            .input(SlotDef::named("gvcf"))
            .input(SlotDef::named("ref"))
            .output(SlotDef::named("vcf"))
            .param(extra())
            .param(java_opts()),
    ]
}

fn bedtools() -> Vec<WrapperDef> {
    vec![
        WrapperDef::new("bedtools/intersect", "Report overlaps between two feature files")
            .input(SlotDef::named("left"))
            .input(SlotDef::named("right"))
            .output(SlotDef::positional("out"))
            .param(extra()),
        WrapperDef::new("bedtools/merge", "Merge overlapping intervals")
            .input(SlotDef::positional("bed").multiple())
            .output(SlotDef::positional("out"))
            .param(extra()),
        WrapperDef::new("bedtools/sort", "Sort a feature file by chromosome and start")
            .input(SlotDef::named("in_file"))
            .input(SlotDef::named("genome").optional())
            .input(SlotDef::named("faidx").optional())
            .output(SlotDef::positional("out"))
            .param(extra()),
    ]
}

fn salmon() -> Vec<WrapperDef> {
    vec![
        WrapperDef::new("salmon/index", "Build a salmon transcriptome index")
            .input(SlotDef::named("sequences"))
            .output(SlotDef::positional("index").directory())
            .param(extra())
            .threaded(),
        WrapperDef::new("salmon/quant", "Quantify transcript abundance from reads")
            .input(SlotDef::named("r1").optional())
            .input(SlotDef::named("r2").optional())
            .input(SlotDef::named("r").optional().multiple().describe("Unpaired reads"))
            .input(SlotDef::named("index"))
            .output(SlotDef::named("quant"))
            .output(SlotDef::named("lib").optional())
            .param(ParamDef::str("libtype").default_value("A"))
            .param(extra())
            .threaded(),
    ]
}

fn qc() -> Vec<WrapperDef> {
    vec![
        WrapperDef::new("fastqc", "Quality control report for sequencing reads")
            .input(SlotDef::positional("reads"))
            .output(SlotDef::named("html"))
            .output(SlotDef::named("zip"))
            .param(extra())
            .param(ParamDef::int("mem_mb").describe("Memory per thread in MB"))
            .threaded(),
        WrapperDef::new("multiqc", "Aggregate QC reports into a single report")
            .input(SlotDef::positional("reports").multiple())
            .output(SlotDef::positional("html"))
            .param(extra())
            .param(ParamDef::bool("use_input_files_only").default_value(false)),
    ]
}
